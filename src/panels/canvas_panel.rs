use egui::{Color32, Rect, Sense, pos2};

use crate::DrawingApp;
use crate::input::PointerSample;
use crate::render::PainterTarget;

/// The host surface: lays out the canvas, forwards the pointer to it and
/// paints background and strokes.
pub fn canvas_panel(app: &mut DrawingApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
            let canvas_rect = response.rect;
            app.set_canvas_rect(canvas_rect);

            painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);
            if let (Some(background), Some(texture)) = (app.background(), app.background_texture()) {
                let placed = background
                    .placement(canvas_rect.size())
                    .translate(canvas_rect.min.to_vec2());
                painter.image(
                    texture.id(),
                    placed,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }

            // Windows floating over the canvas keep their clicks
            let mut sample = PointerSample::from_context(ctx);
            if !response.hovered() {
                sample.pressed = false;
            }
            let gestures = app.gestures_mut().feed(sample, canvas_rect);
            for gesture in gestures {
                gesture.apply(app.canvas_mut());
            }
            if app.canvas_mut().take_dirty() {
                ctx.request_repaint();
            }

            app.canvas().render(&mut PainterTarget::new(&painter, canvas_rect.min));
        });
}
