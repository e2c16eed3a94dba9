use egui::{Align2, Color32, Sense, vec2};

use crate::DrawingApp;

/// Brush size chooser: picking a preset applies it and closes the dialog.
pub fn brush_dialog(app: &mut DrawingApp, ctx: &egui::Context) {
    if !app.brush_dialog_open() {
        return;
    }

    let presets = app.config().brush_presets.all();
    let current = app.canvas().current_thickness();
    let mut open = true;
    let mut chosen = None;

    egui::Window::new("Brush Size")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            for (label, thickness) in presets {
                ui.horizontal(|ui| {
                    let (rect, dot) = ui.allocate_exact_size(vec2(48.0, 48.0), Sense::click());
                    let color = if current == thickness {
                        ui.visuals().selection.bg_fill
                    } else {
                        Color32::BLACK
                    };
                    ui.painter().circle_filled(rect.center(), thickness.min(48.0) / 2.0, color);
                    if dot.clicked() | ui.button(label).clicked() {
                        chosen = Some(thickness);
                    }
                });
            }
        });

    if let Some(thickness) = chosen {
        log::debug!("Brush size set to {thickness}");
        app.set_brush_thickness(thickness);
        open = false;
    }
    app.set_brush_dialog_open(open);
}
