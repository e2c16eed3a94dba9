use egui::{Align2, Color32, Context, Frame, RichText};

use crate::util::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: Level,
    pub text: String,
    expires_at: f64,
}

/// Short-lived messages shown over the canvas.
#[derive(Debug)]
pub struct Notifications {
    toasts: Vec<Toast>,
    lifetime: f64,
}

impl Notifications {
    pub fn new(lifetime_secs: f64) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime: lifetime_secs,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_at(Level::Info, text.into(), time::current_time_secs());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push_at(Level::Error, text.into(), time::current_time_secs());
    }

    fn push_at(&mut self, level: Level, text: String, now: f64) {
        self.toasts.push(Toast {
            level,
            text,
            expires_at: now + self.lifetime,
        });
    }

    /// Drop expired toasts and return the live ones, oldest first.
    pub fn live_at(&mut self, now: f64) -> &[Toast] {
        self.toasts.retain(|toast| toast.expires_at > now);
        &self.toasts
    }

    pub fn show(&mut self, ctx: &Context) {
        let toasts = self.live_at(time::current_time_secs());
        if toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
            .interactable(false)
            .show(ctx, |ui| {
                for toast in toasts {
                    let color = match toast.level {
                        Level::Info => Color32::WHITE,
                        Level::Error => Color32::from_rgb(255, 140, 140),
                    };
                    Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(RichText::new(&toast.text).color(color));
                    });
                }
            });
        // Keep repainting so toasts disappear on time
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut notifications = Notifications::new(2.0);
        notifications.push_at(Level::Info, "saved".to_owned(), 100.0);
        notifications.push_at(Level::Error, "failed".to_owned(), 101.0);

        assert_eq!(notifications.live_at(101.5).len(), 2);
        let live = notifications.live_at(102.5);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].text, "failed");
        assert!(notifications.live_at(103.0).is_empty());
    }
}
