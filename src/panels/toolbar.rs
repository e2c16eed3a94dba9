use egui::{Button, Color32, Stroke, vec2};

use crate::DrawingApp;

pub fn toolbar(app: &mut DrawingApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            let selected = app.selected_swatch();
            let mut clicked_swatch = None;
            for (index, (name, color)) in app.palette().iter().enumerate() {
                let outline = if selected == Some(index) {
                    Stroke::new(3.0, ui.visuals().selection.bg_fill)
                } else {
                    Stroke::new(1.0, Color32::GRAY)
                };
                let swatch = Button::new("")
                    .fill(color.to_color32())
                    .stroke(outline)
                    .min_size(vec2(28.0, 28.0));
                if ui.add(swatch).on_hover_text(name.as_str()).clicked() {
                    clicked_swatch = Some(index);
                }
            }
            if let Some(index) = clicked_swatch {
                app.select_swatch(index);
            }

            let mut picked = app.canvas().current_color().to_color32();
            if egui::color_picker::color_edit_button_srgba(ui, &mut picked, egui::color_picker::Alpha::Opaque)
                .on_hover_text("Pick any color")
                .changed()
            {
                app.pick_color(picked);
            }
        });

        ui.horizontal_wrapped(|ui| {
            if ui.button("🖌 Brush size").clicked() {
                app.set_brush_dialog_open(true);
            }
            if ui.button("🖼 Background").clicked() {
                app.choose_background(ctx);
            }

            ui.separator();

            let can_undo = app.canvas().can_undo();
            let can_redo = app.canvas().can_redo();
            if ui.add_enabled(can_undo, Button::new("⟲ Undo")).clicked() {
                app.undo();
            }
            if ui.add_enabled(can_redo, Button::new("⟳ Redo")).clicked() {
                app.redo();
            }
            if ui.button("🗑 Clear").clicked() {
                app.clear();
            }

            ui.separator();

            let exporting = app.is_exporting();
            if ui.add_enabled(!exporting, Button::new("💾 Save")).clicked() {
                app.save(ctx.pixels_per_point());
            }
            if exporting {
                ui.spinner();
            }
            if ui.button("📤 Share").clicked() {
                app.share();
            }
        });
        ui.add_space(4.0);
    });
}
