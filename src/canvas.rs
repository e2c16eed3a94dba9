use egui::Pos2;

use crate::color::Color;
use crate::history::StrokeHistory;
use crate::render::PaintTarget;
use crate::stroke::{ActiveStroke, StrokeRef, StrokeStyle};

pub const DEFAULT_THICKNESS: f32 = 5.0;

/// The drawing surface: committed strokes, the redo buffer, the stroke of
/// the gesture in progress and the style new gestures start with.
///
/// All operations are total. Input that makes no sense in the current
/// state (moving without a gesture, undo with nothing to undo) is ignored.
/// Every operation that may change what is on screen raises the dirty
/// flag, which the host drains with [`StrokeCanvas::take_dirty`].
#[derive(Debug)]
pub struct StrokeCanvas {
    history: StrokeHistory,
    active: Option<ActiveStroke>,
    color: Color,
    thickness: f32,
    dirty: bool,
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(StrokeStyle::new(Color::BLACK, DEFAULT_THICKNESS))
    }
}

impl StrokeCanvas {
    pub fn new(style: StrokeStyle) -> Self {
        let mut canvas = Self {
            history: StrokeHistory::new(),
            active: None,
            color: style.color,
            thickness: DEFAULT_THICKNESS,
            dirty: false,
        };
        canvas.set_brush_thickness(style.thickness);
        canvas
    }

    /// Start a gesture at `(x, y)` with the current style. A gesture still
    /// in progress is discarded.
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        let mut stroke = ActiveStroke::new(self.current_style());
        if let Some(point) = finite_point(x, y) {
            stroke.add_point(point);
        }
        self.active = Some(stroke);
        self.dirty = true;
    }

    /// Append `(x, y)` to the gesture in progress, if there is one.
    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        let Some(stroke) = &mut self.active else {
            log::trace!("extend_stroke without a gesture, ignored");
            return;
        };
        if let Some(point) = finite_point(x, y) {
            stroke.add_point(point);
        }
        self.dirty = true;
    }

    /// End the gesture in progress. A stroke with at least one point is
    /// committed and the redo buffer dropped; a stroke with no points is
    /// discarded.
    pub fn commit_stroke(&mut self) {
        let Some(stroke) = self.active.take() else {
            log::trace!("commit_stroke without a gesture, ignored");
            return;
        };
        match stroke.freeze() {
            Some(stroke) => {
                log::debug!(
                    "Committed stroke of {} points ({:?}, {})",
                    stroke.points().len(),
                    stroke.color(),
                    stroke.thickness()
                );
                self.history.push(stroke);
            }
            None => log::debug!("Discarded empty stroke"),
        }
        self.dirty = true;
    }

    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo().is_some();
        if changed {
            log::debug!("Undo, {} strokes left", self.history.strokes().len());
            self.dirty = true;
        }
        changed
    }

    /// Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo().is_some();
        if changed {
            log::debug!("Redo, {} strokes", self.history.strokes().len());
            self.dirty = true;
        }
        changed
    }

    /// Drop all committed strokes and the redo buffer. A gesture in progress
    /// survives.
    pub fn clear(&mut self) {
        log::debug!(
            "Clearing {} strokes and {} redoable",
            self.history.strokes().len(),
            self.history.redo_strokes().len()
        );
        self.history.clear();
        self.dirty = true;
    }

    /// Thickness for future gestures. Non-finite or non-positive values are
    /// ignored.
    pub fn set_brush_thickness(&mut self, thickness: f32) {
        if thickness.is_finite() && thickness > 0.0 {
            self.thickness = thickness;
        } else {
            log::warn!("Ignoring invalid brush thickness {thickness}");
        }
    }

    /// Color for future gestures.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Paint committed strokes in commit order, then the gesture in
    /// progress on top.
    pub fn render(&self, target: &mut impl PaintTarget) {
        for stroke in self.history.strokes() {
            target.draw_stroke(stroke.points(), stroke.style());
        }
        if let Some(active) = self.active.as_ref().filter(|s| !s.is_empty()) {
            target.draw_stroke(active.points(), active.style());
        }
    }

    pub fn history(&self) -> &[StrokeRef] {
        self.history.strokes()
    }

    pub fn redo_buffer(&self) -> &[StrokeRef] {
        self.history.redo_strokes()
    }

    pub fn active_stroke(&self) -> Option<&ActiveStroke> {
        self.active.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_color(&self) -> Color {
        self.color
    }

    pub fn current_thickness(&self) -> f32 {
        self.thickness
    }

    pub fn current_style(&self) -> StrokeStyle {
        StrokeStyle::new(self.color, self.thickness)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and reset the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn finite_point(x: f32, y: f32) -> Option<Pos2> {
    if x.is_finite() && y.is_finite() {
        Some(Pos2::new(x, y))
    } else {
        log::warn!("Ignoring non-finite point ({x}, {y})");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(canvas: &mut StrokeCanvas, from: (f32, f32), to: (f32, f32)) {
        canvas.begin_stroke(from.0, from.1);
        canvas.extend_stroke(to.0, to.1);
        canvas.commit_stroke();
    }

    #[test]
    fn test_gesture_sets_dirty() {
        let mut canvas = StrokeCanvas::default();
        assert!(!canvas.take_dirty());

        canvas.begin_stroke(1.0, 1.0);
        assert!(canvas.take_dirty());
        canvas.extend_stroke(2.0, 2.0);
        assert!(canvas.take_dirty());
        canvas.commit_stroke();
        assert!(canvas.take_dirty());
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn test_noop_undo_redo_stay_clean() {
        let mut canvas = StrokeCanvas::default();
        assert!(!canvas.undo());
        assert!(!canvas.redo());
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn test_extend_and_commit_without_gesture() {
        let mut canvas = StrokeCanvas::default();
        canvas.extend_stroke(3.0, 3.0);
        canvas.commit_stroke();
        assert!(canvas.history().is_empty());
        assert!(canvas.active_stroke().is_none());
    }

    #[test]
    fn test_begin_discards_unfinished_gesture() {
        let mut canvas = StrokeCanvas::default();
        canvas.begin_stroke(0.0, 0.0);
        canvas.extend_stroke(5.0, 5.0);
        canvas.begin_stroke(9.0, 9.0);
        canvas.commit_stroke();

        assert_eq!(canvas.history().len(), 1);
        assert_eq!(canvas.history()[0].points(), &[Pos2::new(9.0, 9.0)]);
    }

    #[test]
    fn test_non_finite_points_are_dropped() {
        let mut canvas = StrokeCanvas::default();
        canvas.begin_stroke(f32::NAN, 0.0);
        canvas.extend_stroke(1.0, f32::INFINITY);
        canvas.commit_stroke();
        assert!(canvas.history().is_empty());

        canvas.begin_stroke(1.0, 1.0);
        canvas.extend_stroke(f32::NAN, f32::NAN);
        canvas.extend_stroke(2.0, 2.0);
        canvas.commit_stroke();
        assert_eq!(canvas.history()[0].points().len(), 2);
    }

    #[test]
    fn test_invalid_thickness_is_ignored() {
        let mut canvas = StrokeCanvas::default();
        canvas.set_brush_thickness(12.0);
        canvas.set_brush_thickness(0.0);
        canvas.set_brush_thickness(-3.0);
        canvas.set_brush_thickness(f32::NAN);
        assert_eq!(canvas.current_thickness(), 12.0);

        let canvas = StrokeCanvas::new(StrokeStyle::new(Color::BLACK, -1.0));
        assert_eq!(canvas.current_thickness(), DEFAULT_THICKNESS);
    }

    #[test]
    fn test_clear_keeps_gesture_in_progress() {
        let mut canvas = StrokeCanvas::default();
        draw(&mut canvas, (0.0, 0.0), (1.0, 1.0));
        canvas.begin_stroke(4.0, 4.0);
        canvas.clear();
        canvas.extend_stroke(5.0, 5.0);
        canvas.commit_stroke();

        assert_eq!(canvas.history().len(), 1);
        assert_eq!(canvas.history()[0].points(), &[Pos2::new(4.0, 4.0), Pos2::new(5.0, 5.0)]);
    }
}
