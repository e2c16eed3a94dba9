use crate::stroke::StrokeRef;

/// Committed strokes plus the strokes taken off them by undo.
///
/// `undo_stack` is the render order, earliest first. `redo_stack` holds the
/// most recently undone stroke last, so redo is a pop/push between the two.
#[derive(Debug, Default, Clone)]
pub struct StrokeHistory {
    undo_stack: Vec<StrokeRef>,
    redo_stack: Vec<StrokeRef>,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a stroke. A new edit invalidates everything that could be redone.
    pub fn push(&mut self, stroke: StrokeRef) {
        self.undo_stack.push(stroke);
        self.redo_stack.clear();
    }

    /// Move the last committed stroke to the redo stack.
    pub fn undo(&mut self) -> Option<&StrokeRef> {
        let stroke = self.undo_stack.pop()?;
        self.redo_stack.push(stroke);
        self.redo_stack.last()
    }

    /// Move the most recently undone stroke back onto the committed stack.
    pub fn redo(&mut self) -> Option<&StrokeRef> {
        let stroke = self.redo_stack.pop()?;
        self.undo_stack.push(stroke);
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.undo_stack
    }

    pub fn redo_strokes(&self) -> &[StrokeRef] {
        &self.redo_stack
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::stroke::{Stroke, StrokeStyle};
    use egui::pos2;

    fn stroke(x: f32) -> StrokeRef {
        Stroke::new_ref(StrokeStyle::new(Color::BLACK, 5.0), vec![pos2(x, x)])
    }

    #[test]
    fn test_undo_moves_last_to_redo() {
        let mut history = StrokeHistory::new();
        let (a, b) = (stroke(1.0), stroke(2.0));
        history.push(a.clone());
        history.push(b.clone());

        let undone = history.undo().map(|s| s.id());
        assert_eq!(undone, Some(b.id()));
        assert_eq!(history.strokes().len(), 1);
        assert_eq!(history.redo_strokes()[0].id(), b.id());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = StrokeHistory::new();
        history.push(stroke(1.0));
        history.undo();
        assert!(history.can_redo());

        history.push(stroke(2.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = StrokeHistory::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
