use egui::Pos2;
use std::sync::Arc;
use uuid::Uuid;

use crate::color::Color;

/// Identity of a stroke, stable across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeId(Uuid);

impl StrokeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Color and thickness a stroke is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// Device-independent units.
    pub thickness: f32,
}

impl StrokeStyle {
    pub fn new(color: Color, thickness: f32) -> Self {
        Self { color, thickness }
    }
}

// Frozen stroke, shared between history, redo buffer and export snapshots
#[derive(Debug, Clone)]
pub struct Stroke {
    id: StrokeId,
    style: StrokeStyle,
    points: Vec<Pos2>,
}

pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(style: StrokeStyle, points: Vec<Pos2>) -> Self {
        Self {
            id: StrokeId::new(),
            style,
            points,
        }
    }

    pub fn new_ref(style: StrokeStyle, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(style, points))
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn thickness(&self) -> f32 {
        self.style.thickness
    }
}

/// The stroke of an in-progress gesture. Points can only be appended; the
/// style is fixed when the gesture starts.
#[derive(Debug, Clone)]
pub struct ActiveStroke {
    style: StrokeStyle,
    points: Vec<Pos2>,
}

impl ActiveStroke {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze into a committed stroke. Returns `None` for a stroke with no
    /// points, which is never committed.
    pub fn freeze(self) -> Option<StrokeRef> {
        if self.points.is_empty() {
            None
        } else {
            Some(Stroke::new_ref(self.style, self.points))
        }
    }
}
