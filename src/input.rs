use egui::{Context, Pos2, Rect};

use crate::canvas::StrokeCanvas;

/// The three events a drawing gesture is made of, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Start(Pos2),
    Move(Pos2),
    End,
}

impl Gesture {
    /// Forward the gesture to the canvas.
    pub fn apply(self, canvas: &mut StrokeCanvas) {
        match self {
            Gesture::Start(pos) => canvas.begin_stroke(pos.x, pos.y),
            Gesture::Move(pos) => canvas.extend_stroke(pos.x, pos.y),
            Gesture::End => canvas.commit_stroke(),
        }
    }
}

/// Primary pointer state for one frame, as egui reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    /// Screen position of the pointer or touch, if any.
    pub pos: Option<Pos2>,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
}

impl PointerSample {
    pub fn from_context(ctx: &Context) -> Self {
        ctx.input(|i| Self {
            pos: i.pointer.interact_pos(),
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
        })
    }
}

/// Turns per-frame pointer samples into gestures.
///
/// A gesture starts only with a press inside the canvas, then follows the
/// pointer (even outside the canvas) until release. Only the primary
/// pointer draws.
#[derive(Debug, Default)]
pub struct GestureTracker {
    last_pos: Option<Pos2>,
    drawing: bool,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Translate one frame of pointer state for a canvas shown at `canvas_rect`.
    pub fn feed(&mut self, sample: PointerSample, canvas_rect: Rect) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        let local = sample.pos.map(|pos| (pos - canvas_rect.min).to_pos2());

        if sample.pressed && !self.drawing {
            if let (Some(pos), Some(local)) = (sample.pos, local) {
                if canvas_rect.contains(pos) {
                    gestures.push(Gesture::Start(local));
                    self.drawing = true;
                    self.last_pos = Some(local);
                }
            }
        } else if self.drawing {
            if let Some(local) = local {
                if self.last_pos != Some(local) {
                    gestures.push(Gesture::Move(local));
                    self.last_pos = Some(local);
                }
            }
        }

        // A release, or the button no longer being down (e.g. focus lost
        // mid-drag), ends the gesture
        if self.drawing && (sample.released || !sample.down) {
            gestures.push(Gesture::End);
            self.drawing = false;
            self.last_pos = None;
        }
        gestures
    }
}
