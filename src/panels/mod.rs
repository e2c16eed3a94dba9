mod brush_dialog;
mod canvas_panel;
mod toolbar;

pub use brush_dialog::brush_dialog;
pub use canvas_panel::canvas_panel;
pub use toolbar::toolbar;
