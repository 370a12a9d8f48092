/// Viewer configuration
///
/// Every field has a default, so an empty TOML document is a valid config.

use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraSettings;
use crate::error::{ConfigError, MeshError};
use crate::framebuffer::Color;
use crate::geometry::Mesh;
use crate::obj::load_obj;
use crate::projection::{Projection, DEFAULT_ZMIN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Mesh Viewer".to_string(),
            width: 512,
            height: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub path: PathBuf,
    /// Uniform scale applied once after loading
    pub scale: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bunny.obj"),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub home: [f32; 3],
    pub movement_speed: f32,
    pub rotation_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let settings = CameraSettings::default();
        Self {
            home: settings.home.coords.into(),
            movement_speed: settings.movement_speed,
            rotation_speed: settings.rotation_speed,
        }
    }
}

impl CameraConfig {
    pub fn settings(&self) -> CameraSettings {
        let [x, y, z] = self.home;
        CameraSettings {
            home: Point3::new(x, y, z),
            movement_speed: self.movement_speed,
            rotation_speed: self.rotation_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub zmin: f32,
    /// Overrides the size-derived default when set
    pub draw_scale: Option<f32>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            zmin: DEFAULT_ZMIN,
            draw_scale: None,
        }
    }
}

impl ProjectionConfig {
    /// Projection for a framebuffer of the given size
    pub fn projection(&self, width: usize, height: usize) -> Projection {
        let projection = Projection::new(width, height).with_zmin(self.zmin);
        match self.draw_scale {
            Some(scale) => projection.with_draw_scale(scale),
            None => projection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub fill: Color,
    pub background: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            fill: Color::RED,
            background: Color::BLACK,
        }
    }
}

/// Top-level configuration shared by every host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub mesh: MeshConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub colors: ColorConfig,
}

impl ViewerConfig {
    /// Load and validate a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build from command-line arguments: `[mesh.obj] [config.toml]`.
    ///
    /// The mesh argument overrides `mesh.path` from the config file.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mesh = args.next();
        let mut config = match args.next() {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(mesh) = mesh {
            config.mesh.path = PathBuf::from(mesh);
        }
        Ok(config)
    }

    /// Load the configured mesh and apply its scale
    pub fn load_mesh(&self) -> Result<Mesh, MeshError> {
        Ok(load_obj(&self.mesh.path)?.scaled(self.mesh.scale))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        // Also rejects NaN
        if !(self.projection.zmin < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "projection.zmin must be negative, got {}",
                self.projection.zmin
            )));
        }
        if let Some(scale) = self.projection.draw_scale {
            if !(scale > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "projection.draw_scale must be positive, got {}",
                    scale
                )));
            }
        }
        if !(self.mesh.scale > 0.0) {
            return Err(ConfigError::Invalid(format!("mesh.scale must be positive, got {}", self.mesh.scale)));
        }
        if !(self.camera.movement_speed > 0.0) || !(self.camera.rotation_speed > 0.0) {
            return Err(ConfigError::Invalid("camera speeds must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.width, 512);
        assert_eq!(config.camera.home, [0.0, 0.0, 1.5]);
        assert_eq!(config.colors.fill, Color::RED);
        assert_eq!(config.projection.projection(512, 512).draw_scale, 1024.0);
    }

    #[test]
    fn test_partial_document() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [mesh]
            path = "models/bunny.obj"
            scale = 10.0

            [camera]
            home = [0.0, 0.0, 10.0]

            [projection]
            draw_scale = 512.0

            [colors]
            fill = [0.0, 1.0, 0.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.mesh.path, PathBuf::from("models/bunny.obj"));
        assert_eq!(config.mesh.scale, 10.0);
        assert_eq!(config.camera.settings().home, Point3::new(0.0, 0.0, 10.0));
        assert_eq!(config.camera.movement_speed, 2.0);
        assert_eq!(config.projection.projection(512, 512).draw_scale, 512.0);
        assert_eq!(config.colors.fill, Color::new(0.0, 1.0, 0.0));
        assert_eq!(config.colors.background, Color::BLACK);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ViewerConfig::from_toml_str("[projection]\nzmin = 0.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewerConfig::from_toml_str("[window]\nwidth = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewerConfig::from_toml_str("[mesh]\nscale = -1.0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_args() {
        let config = ViewerConfig::from_args(vec!["teapot.obj".to_string()]).unwrap();
        assert_eq!(config.mesh.path, PathBuf::from("teapot.obj"));
        assert_eq!(config.window, WindowConfig::default());

        let config = ViewerConfig::from_args(Vec::new()).unwrap();
        assert_eq!(config.mesh.path, PathBuf::from("bunny.obj"));

        let missing = ViewerConfig::from_args(vec!["a.obj".to_string(), "/nonexistent/meshview.toml".to_string()]);
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_mesh_reports_missing_file() {
        let mut config = ViewerConfig::default();
        config.mesh.path = PathBuf::from("/nonexistent/bunny.obj");
        assert!(matches!(config.load_mesh(), Err(MeshError::Io { .. })));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            ViewerConfig::from_toml_str("[window\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = ViewerConfig::default();
        config.projection.draw_scale = Some(300.0);
        let text = config.to_toml_string().unwrap();
        assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), config);
    }
}
