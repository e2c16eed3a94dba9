mod cache;
mod painter;
mod raster;

pub use cache::LayerCache;
pub use painter::PainterTarget;
pub use raster::RasterTarget;

use egui::Pos2;

use crate::stroke::StrokeStyle;

/// Something strokes can be painted onto.
///
/// Points are in canvas coordinates (device-independent units, origin at
/// the canvas' top-left corner). Implementations map them to their own
/// space. Every call paints on top of what was painted before.
pub trait PaintTarget {
    /// Paint one stroke. A single point is a round dot of diameter
    /// `style.thickness`; an empty slice paints nothing.
    fn draw_stroke(&mut self, points: &[Pos2], style: StrokeStyle);
}

impl<T: PaintTarget + ?Sized> PaintTarget for &mut T {
    fn draw_stroke(&mut self, points: &[Pos2], style: StrokeStyle) {
        (**self).draw_stroke(points, style);
    }
}
