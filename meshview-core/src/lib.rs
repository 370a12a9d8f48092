/// meshview core library - host independent software rendering
///
/// OBJ loading, the fly camera, perspective projection with near-plane
/// culling and the scanline triangle fill. Window, terminal and web hosts
/// feed input events in and present the resulting pixel buffer.

pub mod camera;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod input;
pub mod obj;
pub mod projection;
pub mod raster;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use camera::{Camera, CameraSettings, Direction, MovementIntent};
pub use config::ViewerConfig;
pub use error::{ConfigError, MeshError};
pub use framebuffer::{Color, Framebuffer, PixelBuffer, Surface};
pub use geometry::{Mesh, MeshBuilder};
pub use input::{Flow, InputEvent, Key};
pub use obj::{load_obj, parse_obj};
pub use projection::{FrameStats, Projection};
pub use raster::{fill_triangle, ScreenPoint};
pub use transform::{rotate3d, Orientation};
pub use viewer::{FrameClock, Viewer};
