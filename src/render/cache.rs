use image::RgbaImage;

use super::{PaintTarget, RasterTarget};
use crate::canvas::StrokeCanvas;
use crate::stroke::{StrokeId, StrokeRef};

/// Raster of the committed strokes, kept between renders.
///
/// Committing only appends to history, so the common case is painting the
/// new strokes over the cached layer. Anything else (undo, clear, a new
/// size or scale) repaints the layer from scratch.
#[derive(Debug)]
pub struct LayerCache {
    layer: RasterTarget,
    painted: Vec<StrokeId>,
    full_repaints: u64,
}

impl Default for LayerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerCache {
    pub fn new() -> Self {
        Self {
            layer: RasterTarget::new(0, 0, 1.0),
            painted: Vec::new(),
            full_repaints: 0,
        }
    }

    /// Bring the layer in line with `strokes` and return it.
    pub fn update(&mut self, strokes: &[StrokeRef], width: u32, height: u32, scale: f32) -> &RgbaImage {
        let resized = self.layer.dimensions() != (width, height) || self.layer.scale() != scale;
        let is_prefix = self.painted.len() <= strokes.len()
            && self.painted.iter().zip(strokes).all(|(id, stroke)| *id == stroke.id());

        if resized || !is_prefix {
            log::debug!("Repainting stroke layer ({width}x{height} @ {scale})");
            self.layer = RasterTarget::new(width, height, scale);
            self.painted.clear();
            self.full_repaints += 1;
        }

        for stroke in &strokes[self.painted.len()..] {
            self.layer.draw_stroke(stroke.points(), stroke.style());
            self.painted.push(stroke.id());
        }
        self.layer.image()
    }

    /// A full frame of `canvas`: the committed layer plus the gesture in
    /// progress on top.
    pub fn render_frame(&mut self, canvas: &StrokeCanvas, width: u32, height: u32, scale: f32) -> RgbaImage {
        let layer = self.update(canvas.history(), width, height, scale).clone();
        let mut frame = RasterTarget::from_image(layer, scale);
        if let Some(active) = canvas.active_stroke() {
            frame.draw_stroke(active.points(), active.style());
        }
        frame.into_image()
    }

    /// How many times the layer was repainted from scratch.
    pub fn full_repaints(&self) -> u64 {
        self.full_repaints
    }
}
