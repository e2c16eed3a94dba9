use std::borrow::Cow;

use egui::{Color32, Rect};
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::canvas::StrokeCanvas;
use crate::color::Color;
use crate::compositor::Background;
use crate::config::DrawingConfig;
use crate::error::BackgroundError;
use crate::export::{self, ClipboardShare, ExportSettings, Exporter};
use crate::file_handler::FileHandler;
use crate::input::GestureTracker;
use crate::notify::Notifications;
use crate::panels;
use crate::render::LayerCache;
use crate::stroke::StrokeStyle;

/// Brush style restored on the next start. Strokes themselves are not kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct SavedStyle {
    color: Color,
    thickness: f32,
    swatch: Option<usize>,
}

pub struct DrawingApp {
    config: DrawingConfig,
    canvas: StrokeCanvas,
    gestures: GestureTracker,
    palette: Vec<(String, Color)>,
    selected_swatch: Option<usize>,
    show_brush_dialog: bool,
    background: Option<Background>,
    background_texture: Option<egui::TextureHandle>,
    files: FileHandler,
    exporter: Exporter,
    layer_cache: LayerCache,
    notifications: Notifications,
    share: ClipboardShare,
    canvas_rect: Rect,
}

impl DrawingApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: DrawingConfig) -> Self {
        let saved: Option<SavedStyle> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY));
        Self::with_saved_style(cc.egui_ctx.clone(), config, saved)
    }

    fn with_saved_style(ctx: egui::Context, config: DrawingConfig, saved: Option<SavedStyle>) -> Self {
        let palette: Vec<(String, Color)> = config
            .palette
            .iter()
            .filter_map(|swatch| match swatch.color() {
                Ok(color) => Some((swatch.name.clone(), color)),
                Err(err) => {
                    log::warn!("Skipping palette entry: {err}");
                    None
                }
            })
            .collect();

        let (style, selected_swatch) = match saved {
            Some(saved) => {
                log::debug!("Restored brush style {saved:?}");
                let swatch = saved.swatch.filter(|i| *i < palette.len());
                (StrokeStyle::new(saved.color, saved.thickness), swatch)
            }
            None => (
                StrokeStyle::new(config.default_color(), config.default_thickness),
                Some(config.default_swatch).filter(|i| *i < palette.len()),
            ),
        };

        Self {
            canvas: StrokeCanvas::new(style),
            gestures: GestureTracker::new(),
            palette,
            selected_swatch,
            show_brush_dialog: false,
            background: None,
            background_texture: None,
            files: FileHandler::new(config.background_fit),
            exporter: Exporter::new(),
            layer_cache: LayerCache::new(),
            notifications: Notifications::new(config.toast_seconds),
            share: ClipboardShare::new(ctx),
            canvas_rect: Rect::NOTHING,
            config,
        }
    }

    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut StrokeCanvas {
        &mut self.canvas
    }

    pub(crate) fn gestures_mut(&mut self) -> &mut GestureTracker {
        &mut self.gestures
    }

    pub(crate) fn config(&self) -> &DrawingConfig {
        &self.config
    }

    pub(crate) fn palette(&self) -> &[(String, Color)] {
        &self.palette
    }

    pub(crate) fn selected_swatch(&self) -> Option<usize> {
        self.selected_swatch
    }

    /// Choose a palette color. Re-selecting the current swatch does nothing.
    pub fn select_swatch(&mut self, index: usize) {
        if self.selected_swatch == Some(index) {
            return;
        }
        if let Some((name, color)) = self.palette.get(index) {
            log::debug!("Selected swatch {name}");
            self.canvas.set_color(*color);
            self.selected_swatch = Some(index);
        }
    }

    /// A color from the free color picker; no swatch stays selected.
    pub fn pick_color(&mut self, color: Color32) {
        self.canvas.set_color(Color::from_color32(color));
        self.selected_swatch = None;
    }

    pub fn set_brush_thickness(&mut self, thickness: f32) {
        self.canvas.set_brush_thickness(thickness);
    }

    pub(crate) fn brush_dialog_open(&self) -> bool {
        self.show_brush_dialog
    }

    pub(crate) fn set_brush_dialog_open(&mut self, open: bool) {
        self.show_brush_dialog = open;
    }

    pub fn undo(&mut self) {
        self.canvas.undo();
    }

    pub fn redo(&mut self) {
        self.canvas.redo();
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub(crate) fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub(crate) fn background_texture(&self) -> Option<&egui::TextureHandle> {
        self.background_texture.as_ref()
    }

    pub(crate) fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Ask for a background image with the file dialog.
    pub(crate) fn choose_background(&mut self, ctx: &egui::Context) {
        let Some(path) = self.files.pick_file() else {
            log::debug!("Background selection cancelled");
            return;
        };
        let result = self.files.load_path(&path);
        self.apply_background(ctx, result);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if let Some(file) = self.files.take_dropped_file(ctx) {
            let result = self.files.load_dropped(&file);
            self.apply_background(ctx, result);
        }
    }

    fn apply_background(&mut self, ctx: &egui::Context, result: Result<Background, BackgroundError>) {
        match result {
            Ok(background) => {
                // The GPU caps texture sides; compose keeps the full raster
                let max_side = ctx.input(|i| i.max_texture_side);
                let image = texture_image(background.image(), max_side);
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width() as usize, image.height() as usize],
                    image.as_raw(),
                );
                self.background_texture =
                    Some(ctx.load_texture("background", color_image, egui::TextureOptions::LINEAR));
                self.background = Some(background);
                ctx.request_repaint();
            }
            Err(err @ BackgroundError::PermissionDenied { .. }) => {
                log::warn!("{err}");
                self.notifications.error("Storage access denied!");
            }
            Err(err) => {
                log::error!("Failed to load background: {err}");
                self.notifications.error(err.to_string());
            }
        }
    }

    pub(crate) fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    /// Snapshot the drawing now and write it out in the background.
    pub fn save(&mut self, pixels_per_point: f32) {
        let result = export::snapshot(
            &self.canvas,
            &mut self.layer_cache,
            self.background.as_ref(),
            self.canvas_rect.size(),
            pixels_per_point,
        )
        .and_then(|snapshot| {
            self.exporter
                .start(snapshot, ExportSettings::from_config(&self.config))
        });
        if let Err(err) = result {
            log::warn!("Could not start export: {err}");
            self.notifications.error(err.to_string());
        }
    }

    /// Share the last saved image.
    pub fn share(&mut self) {
        match self.exporter.share_last(&mut self.share) {
            Ok(exported) => self
                .notifications
                .info(format!("Copied {} to the clipboard", exported.path.display())),
            Err(err) => self.notifications.error(err.to_string()),
        }
    }

    fn poll_export(&mut self, ctx: &egui::Context) {
        if !self.exporter.is_busy() {
            return;
        }
        match self.exporter.poll() {
            Some(Ok(exported)) => {
                self.notifications
                    .info(format!("File saved successfully: {}", exported.path.display()));
                self.share();
            }
            Some(Err(err)) => self.notifications.error(format!("Something went wrong! {err}")),
            None => ctx.request_repaint_after(std::time::Duration::from_millis(50)),
        }
    }

    fn saved_style(&self) -> SavedStyle {
        SavedStyle {
            color: self.canvas.current_color(),
            thickness: self.canvas.current_thickness(),
            swatch: self.selected_swatch,
        }
    }
}

/// `image`, scaled down to keep its aspect ratio if a side exceeds `max_side`.
fn texture_image(image: &RgbaImage, max_side: usize) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let max_side = u32::try_from(max_side).unwrap_or(u32::MAX).max(1);
    let longest = width.max(height);
    if longest <= max_side {
        return Cow::Borrowed(image);
    }
    let scale = f64::from(max_side) / f64::from(longest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_side);
    log::debug!(
        "Background {width}x{height} exceeds texture limit {max_side}, showing {}x{}",
        fit(width),
        fit(height)
    );
    Cow::Owned(imageops::thumbnail(image, fit(width), fit(height)))
}

impl eframe::App for DrawingApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.saved_style());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.poll_export(ctx);

        panels::toolbar(self, ctx);
        panels::brush_dialog(self, ctx);
        panels::canvas_panel(self, ctx);

        self.notifications.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Let a running export finish writing its file
        if let Some(Err(err)) = self.exporter.wait() {
            log::error!("Export failed during shutdown: {err}");
        }
    }
}
