/// Wavefront OBJ loader
use nom::{
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use nalgebra::Point3;

use crate::error::MeshError;
use crate::geometry::{Mesh, MeshBuilder};

/// One corner of an `f` statement, with raw (1-based or negative) indices
#[derive(Debug, Clone, Copy, PartialEq)]
struct FaceCorner {
    position: i64,
    tex_coord: Option<i64>,
}

#[derive(Debug, PartialEq)]
enum Statement {
    Position([f32; 3]),
    TexCoord([f32; 2]),
    Face(Vec<FaceCorner>),
    Ignored,
}

/// Read and parse an OBJ file from disk
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = parse_obj(&source)?;
    match mesh.bounds() {
        Some((min, max)) => info!(
            "Loaded {}: {} vertices, {} faces, bounds ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        ),
        None => info!("Loaded {}: empty mesh", path.display()),
    }
    Ok(mesh)
}

/// Parse OBJ source text into a mesh.
///
/// Faces with more than three corners are fan-triangulated. Every distinct
/// (position, texture coordinate) pair becomes one mesh vertex.
pub fn parse_obj(source: &str) -> Result<Mesh, MeshError> {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut builder = MeshBuilder::new();
    let mut vertex_ids: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    let mut has_tex_coords = false;

    for (number, raw) in source.lines().enumerate() {
        let line = number + 1;
        let text = match raw.find('#') {
            Some(comment) => &raw[..comment],
            None => raw,
        }
        .trim();
        if text.is_empty() {
            continue;
        }

        let statement = match all_consuming(terminated(statement, space0))(text) {
            Ok((_, statement)) => statement,
            Err(e) => {
                return Err(MeshError::Parse {
                    line,
                    message: format!("malformed statement {:?}: {:?}", text, e),
                })
            }
        };

        match statement {
            Statement::Position([x, y, z]) => positions.push(Point3::new(x, y, z)),
            Statement::TexCoord(uv) => tex_coords.push(uv),
            Statement::Face(corners) => {
                if corners.len() < 3 {
                    return Err(MeshError::Parse {
                        line,
                        message: format!("face has {} corners, need at least 3", corners.len()),
                    });
                }

                let mut ids = Vec::with_capacity(corners.len());
                for corner in &corners {
                    let position = resolve_index(corner.position, positions.len(), line)?;
                    let tex_coord = match corner.tex_coord {
                        Some(raw) => Some(resolve_index(raw, tex_coords.len(), line)?),
                        None => None,
                    };
                    has_tex_coords |= tex_coord.is_some();

                    let id = *vertex_ids.entry((position, tex_coord)).or_insert_with(|| {
                        builder.push_vertex(positions[position], tex_coord.map(|t| tex_coords[t]))
                    });
                    ids.push(id);
                }

                for i in 1..ids.len() - 1 {
                    builder.push_face([ids[0], ids[i], ids[i + 1]]);
                }
            }
            Statement::Ignored => {}
        }
    }

    builder.build(has_tex_coords)
}

/// Turn an OBJ index (1-based, or negative relative to the end) into a slot
fn resolve_index(raw: i64, count: usize, line: usize) -> Result<usize, MeshError> {
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        count as i64 + raw
    } else {
        -1
    };

    if resolved < 0 || resolved as usize >= count {
        return Err(MeshError::Parse {
            line,
            message: format!("index {} is out of range ({} defined)", raw, count),
        });
    }
    Ok(resolved as usize)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    let (rest, keyword) = nom::bytes::complete::take_till1(|c: char| c.is_whitespace())(input)?;
    match keyword {
        "v" => map(preceded(space1, vector3), Statement::Position)(rest),
        "vt" => map(preceded(space1, tex_coord), Statement::TexCoord)(rest),
        "f" => map(preceded(space1, separated_list1(space1, face_corner)), Statement::Face)(rest),
        // Normals, groups, materials, smoothing
        _ => Ok(("", Statement::Ignored)),
    }
}

fn vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, (x, y, z)) = tuple((float, preceded(space1, float), preceded(space1, float)))(input)?;
    // Optional homogeneous weight
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, [x, y, z]))
}

fn tex_coord(input: &str) -> IResult<&str, [f32; 2]> {
    let (input, u) = float(input)?;
    let (input, v) = opt(preceded(space1, float))(input)?;
    let (input, _) = opt(preceded(space1, float))(input)?;
    Ok((input, [u, v.unwrap_or(0.0)]))
}

/// `i`, `i/t`, `i//n` or `i/t/n`
fn face_corner(input: &str) -> IResult<&str, FaceCorner> {
    let (input, position) = integer(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        pair(opt(integer), opt(preceded(char('/'), opt(integer)))),
    ))(input)?;
    let tex_coord = rest.and_then(|(t, _)| t);
    Ok((input, FaceCorner { position, tex_coord }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triangle() {
        let mesh = parse_obj("v 0 0 -5\nv 1 0 -5\nv 0 1 -5\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces()[0], [0, 1, 2]);
        assert_eq!(mesh.position(1), Point3::new(1.0, 0.0, -5.0));
        assert!(mesh.tex_coords().is_empty());
    }

    #[test]
    fn test_comments_and_unknown_statements() {
        let source = "# exported\nmtllib bunny.mtl\no bunny\nv 0 0 0 # origin\nv 1 0 0\nv 0 1 0\nvn 0 0 1\ns off\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_tex_coords_split_vertices() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvt 0.5 0.5\nf 1/1 2/2 3/3\nf 1/4 3/3 2/2\n";
        let mesh = parse_obj(source).unwrap();
        // Position 1 appears with two different UVs
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces()[1], [3, 2, 1]);
        assert_eq!(mesh.tex_coords()[3], [0.5, 0.5]);
        assert_eq!(mesh.position(3), mesh.position(0));
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_negative_indices() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.faces()[0], [0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        match err {
            MeshError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_malformed_vertex() {
        assert!(matches!(
            parse_obj("v 0 zero 0\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_no_faces_is_an_error() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(MeshError::Empty)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_obj("/nonexistent/bunny.obj").unwrap_err();
        assert!(matches!(err, MeshError::Io { .. }));
    }
}
