/// Browser host: renders into a 2D canvas through `ImageData`
///
/// The page owns the event listeners and the animation loop. It forwards
/// `KeyboardEvent.code` strings, canvas-relative mouse coordinates and the
/// `requestAnimationFrame` timestamp, then calls `present` with the canvas
/// context.
use meshview_core::{
    parse_obj, Flow, Framebuffer, FrameStats, InputEvent, Key, PixelBuffer, Surface, Viewer,
    ViewerConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

/// Map a `KeyboardEvent.code` value to a viewer key
pub fn key_from_code(code: &str) -> Key {
    match code {
        "ArrowUp" => Key::Up,
        "ArrowDown" => Key::Down,
        "ArrowLeft" => Key::Left,
        "ArrowRight" => Key::Right,
        "KeyW" => Key::W,
        "KeyA" => Key::A,
        "KeyS" => Key::S,
        "KeyD" => Key::D,
        "KeyR" => Key::R,
        "KeyL" => Key::L,
        "KeyQ" => Key::Q,
        "Escape" => Key::Escape,
        _ => Key::Other,
    }
}

/// Copies finished frames into a canvas
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface<'_> {
    type Error = JsValue;

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), JsValue> {
        let rgba = frame.to_rgba();
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&rgba),
            frame.width() as u32,
            frame.height() as u32,
        )?;
        self.ctx.put_image_data(&image, 0.0, 0.0)
    }
}

#[wasm_bindgen]
pub struct WebViewer {
    viewer: Viewer,
    buffer: PixelBuffer,
    last_stats: FrameStats,
}

#[wasm_bindgen]
impl WebViewer {
    /// Build a viewer from OBJ text, rendering at `width` x `height`
    #[wasm_bindgen(constructor)]
    pub fn new(obj_source: &str, width: usize, height: usize) -> Result<WebViewer, JsValue> {
        let mesh = parse_obj(obj_source).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let config = ViewerConfig::default();

        Ok(WebViewer {
            viewer: Viewer::with_size(mesh, &config, width, height),
            buffer: PixelBuffer::new(width, height),
            last_stats: FrameStats::default(),
        })
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewer.resize(width, height);
        self.buffer.resize(width, height);
    }

    /// Returns false once the user asked to quit
    pub fn key_down(&mut self, code: &str) -> bool {
        self.dispatch(InputEvent::KeyDown(key_from_code(code)))
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.dispatch(InputEvent::KeyUp(key_from_code(code)))
    }

    pub fn mouse_down(&mut self, x: i32, y: i32) {
        self.dispatch(InputEvent::MousePress { x, y });
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) {
        self.dispatch(InputEvent::MouseMove { x, y });
    }

    pub fn mouse_up(&mut self, x: i32, y: i32) {
        self.dispatch(InputEvent::MouseRelease { x, y });
    }

    /// Advance the camera and rasterize; `now_ms` is a `performance.now()` timestamp
    pub fn frame(&mut self, now_ms: f64) {
        self.viewer.update(now_ms / 1000.0);
        self.last_stats = self.viewer.render(&mut self.buffer);
    }

    pub fn present(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        CanvasSurface::new(ctx).present(&self.buffer)
    }

    /// Triangles drawn in the last frame
    pub fn drawn(&self) -> usize {
        self.last_stats.drawn
    }

    /// Triangles culled in the last frame
    pub fn culled(&self) -> usize {
        self.last_stats.culled
    }
}

impl WebViewer {
    fn dispatch(&mut self, event: InputEvent) -> bool {
        self.viewer.handle_event(event) == Flow::Continue
    }
}
