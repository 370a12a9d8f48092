/// Pixel sinks the rasterizer writes into
use serde::{Deserialize, Serialize};

/// An RGB colour with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0x00RRGGBB`. Channels are clamped, then truncated to 8 bits.
    pub fn to_rgb(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
        channel(self.r) << 16 | channel(self.g) << 8 | channel(self.b)
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [f32; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

/// Write access to a grid of pixels.
///
/// `set_pixel` must ignore coordinates outside the grid; the rasterizer
/// relies on it for clipping.
pub trait Framebuffer {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);
    fn clear(&mut self, color: Color);
}

/// Presents a finished frame to the user
pub trait Surface {
    type Error;

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), Self::Error>;
}

/// Row-major CPU framebuffer of packed `0x00RRGGBB` pixels
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocate for a new size; contents are cleared to black
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, `None` outside the buffer
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Pixels expanded to RGBA bytes with opaque alpha
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &pixel in &self.pixels {
            bytes.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, 0xff]);
        }
        bytes
    }
}

impl Framebuffer for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color.to_rgb();
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_rgb());
    }
}
