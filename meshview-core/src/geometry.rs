/// Mesh storage for the renderer
use nalgebra::Point3;

use crate::error::MeshError;

/// An immutable indexed triangle mesh.
///
/// Built through [`MeshBuilder`], which guarantees that every face index is
/// in range. Texture coordinates are carried along when the source provides
/// them but the renderer only ever reads positions.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Point3<f32>>,
    tex_coords: Vec<[f32; 2]>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Per-vertex UVs, empty when the source had none
    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Position of vertex `index`
    pub fn position(&self, index: usize) -> Point3<f32> {
        self.positions[index]
    }

    /// Vertex index stored at `corner` (0, 1 or 2) of face `face`
    pub fn index(&self, face: usize, corner: usize) -> u32 {
        self.faces[face][corner]
    }

    /// The three corner positions of a face
    pub fn triangle(&self, face: usize) -> [Point3<f32>; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Uniformly scale every position, consuming the mesh
    pub fn scaled(mut self, factor: f32) -> Self {
        for position in &mut self.positions {
            position.coords *= factor;
        }
        self
    }

    /// Axis-aligned bounds as (min, max), `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}

/// Accumulates vertices and faces and validates them into a [`Mesh`]
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<Point3<f32>>,
    tex_coords: Vec<[f32; 2]>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, position: Point3<f32>, tex_coord: Option<[f32; 2]>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.tex_coords.push(tex_coord.unwrap_or([0.0, 0.0]));
        index
    }

    pub fn push_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Validate indices and freeze the mesh.
    ///
    /// `has_tex_coords` decides whether the collected UVs are kept; a mesh
    /// without any texture data exposes an empty UV slice.
    pub fn build(self, has_tex_coords: bool) -> Result<Mesh, MeshError> {
        if self.faces.is_empty() {
            return Err(MeshError::Empty);
        }

        let vertex_count = self.positions.len();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Mesh {
            positions: self.positions,
            tex_coords: if has_tex_coords { self.tex_coords } else { Vec::new() },
            faces: self.faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Mesh {
        let mut builder = MeshBuilder::new();
        let a = builder.push_vertex(Point3::new(0.0, 0.0, -5.0), None);
        let b = builder.push_vertex(Point3::new(1.0, 0.0, -5.0), None);
        let c = builder.push_vertex(Point3::new(0.0, 1.0, -5.0), None);
        builder.push_face([a, b, c]);
        builder.build(false).unwrap()
    }

    #[test]
    fn test_counts_and_accessors() {
        let mesh = single_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.index(0, 1), 1);
        assert_eq!(mesh.position(2), Point3::new(0.0, 1.0, -5.0));
        assert!(mesh.tex_coords().is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let mut builder = MeshBuilder::new();
        builder.push_vertex(Point3::origin(), None);
        builder.push_face([0, 0, 3]);
        match builder.build(false) {
            Err(MeshError::IndexOutOfRange { face, index, vertex_count }) => {
                assert_eq!((face, index, vertex_count), (0, 3, 1));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_mesh() {
        assert!(matches!(MeshBuilder::new().build(false), Err(MeshError::Empty)));
    }

    #[test]
    fn test_scaled_and_bounds() {
        let mesh = single_triangle().scaled(10.0);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, -50.0));
        assert_eq!(max, Point3::new(10.0, 10.0, -50.0));
        assert_eq!(mesh.triangle(0)[1], Point3::new(10.0, 0.0, -50.0));
    }
}
