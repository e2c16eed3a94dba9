//! Saving the composed drawing as a PNG and handing it to a share target.
//!
//! The raster is composed on the UI thread ([`snapshot`]) and only then
//! moved to a worker thread for encoding and writing, so strokes drawn
//! while an export runs never end up in the file.

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::sync::Arc;

use egui::Vec2;
use futures::channel::oneshot;
use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;

use crate::canvas::StrokeCanvas;
use crate::compositor::{self, Background};
use crate::config::DrawingConfig;
use crate::error::ExportError;
use crate::render::LayerCache;
use crate::util::time;

pub const PNG_MIME: &str = "image/png";

/// Gives up on finding a free name after this many collisions.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub prefix: String,
}

impl ExportSettings {
    pub fn from_config(config: &DrawingConfig) -> Self {
        Self {
            dir: config.export_dir.clone(),
            prefix: config.export_prefix.clone(),
        }
    }
}

/// A written export file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub mime: &'static str,
}

pub type ExportResult = Result<ExportedImage, ExportError>;

/// `<prefix><timestamp>.png`, with `_<n>` appended for the n-th collision.
pub fn file_name(prefix: &str, timestamp: u64, attempt: u32) -> String {
    if attempt == 0 {
        format!("{prefix}{timestamp}.png")
    } else {
        format!("{prefix}{timestamp}_{attempt}.png")
    }
}

/// Compose the current frame (background, committed strokes, gesture in
/// progress) at `scale` pixels per canvas unit.
pub fn snapshot(
    canvas: &StrokeCanvas,
    cache: &mut LayerCache,
    background: Option<&Background>,
    canvas_size: Vec2,
    scale: f32,
) -> Result<RgbaImage, ExportError> {
    let width = (canvas_size.x * scale).round();
    let height = (canvas_size.y * scale).round();
    if !(width >= 1.0 && height >= 1.0) {
        return Err(ExportError::EmptyCanvas);
    }
    let strokes = cache.render_frame(canvas, width as u32, height as u32, scale);
    Ok(compositor::compose(background, &strokes))
}

/// Encode `raster` as PNG and write it under a name no existing file has.
pub fn save_png(raster: &RgbaImage, settings: &ExportSettings, timestamp: u64) -> ExportResult {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(ExportError::EmptyCanvas);
    }

    let mut bytes = Vec::new();
    raster.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    fs::create_dir_all(&settings.dir).map_err(|err| ExportError::io(&settings.dir, err))?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = settings.dir.join(file_name(&settings.prefix, timestamp, attempt));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(ExportError::io(&path, err)),
        };
        if let Err(err) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(ExportError::io(&path, err));
        }
        return Ok(ExportedImage { path, mime: PNG_MIME });
    }

    let path = settings.dir.join(file_name(&settings.prefix, timestamp, 0));
    Err(ExportError::io(&path, io::Error::from(io::ErrorKind::AlreadyExists)))
}

/// Runs one export at a time on a worker thread.
#[derive(Debug, Default)]
pub struct Exporter {
    pending: Option<oneshot::Receiver<ExportResult>>,
    last_export: Arc<Mutex<Option<ExportedImage>>>,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start writing `snapshot` in the background. Poll for the result with
    /// [`Exporter::poll`].
    pub fn start(&mut self, snapshot: RgbaImage, settings: ExportSettings) -> Result<(), ExportError> {
        if self.is_busy() {
            return Err(ExportError::Busy);
        }
        if snapshot.width() == 0 || snapshot.height() == 0 {
            return Err(ExportError::EmptyCanvas);
        }

        let (sender, receiver) = oneshot::channel();
        let last_export = Arc::clone(&self.last_export);
        let timestamp = time::timestamp_secs();
        let dir = settings.dir.clone();
        log::info!(
            "Exporting {}x{} image to {}",
            snapshot.width(),
            snapshot.height(),
            dir.display()
        );

        std::thread::Builder::new()
            .name("export".to_owned())
            .spawn(move || {
                let result = save_png(&snapshot, &settings, timestamp);
                match &result {
                    Ok(exported) => {
                        log::info!("Saved {}", exported.path.display());
                        *last_export.lock() = Some(exported.clone());
                    }
                    Err(err) => log::error!("Export failed: {err}"),
                }
                // The receiver may be gone if the app is shutting down
                let _ = sender.send(result);
            })
            .map_err(|err| ExportError::io(&dir, err))?;

        self.pending = Some(receiver);
        Ok(())
    }

    /// The result of the running export, once it has finished.
    pub fn poll(&mut self) -> Option<ExportResult> {
        let receiver = self.pending.as_mut()?;
        let result = match receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(ExportError::WorkerGone),
        };
        self.pending = None;
        Some(result)
    }

    /// Block until the running export has finished.
    pub fn wait(&mut self) -> Option<ExportResult> {
        let receiver = self.pending.take()?;
        Some(futures::executor::block_on(receiver).unwrap_or(Err(ExportError::WorkerGone)))
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The most recent successful export.
    pub fn last_export(&self) -> Option<ExportedImage> {
        self.last_export.lock().clone()
    }

    /// Hand the most recent export to `sink`.
    pub fn share_last(&self, sink: &mut dyn ShareSink) -> ExportResult {
        let exported = self.last_export().ok_or(ExportError::NothingToShare)?;
        sink.share(&exported)?;
        Ok(exported)
    }
}

/// Where an exported image goes to be shared.
pub trait ShareSink {
    fn share(&mut self, image: &ExportedImage) -> Result<(), ExportError>;
}

/// Desktop stand-in for a share sheet: puts the file path on the clipboard.
pub struct ClipboardShare {
    ctx: egui::Context,
}

impl ClipboardShare {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl ShareSink for ClipboardShare {
    fn share(&mut self, image: &ExportedImage) -> Result<(), ExportError> {
        log::info!("Sharing {} ({})", image.path.display(), image.mime);
        self.ctx.copy_text(image.path.display().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(file_name("DrawingApp", 1700000000, 0), "DrawingApp1700000000.png");
        assert_eq!(file_name("DrawingApp", 1700000000, 2), "DrawingApp1700000000_2.png");
    }

    #[test]
    fn test_empty_raster_is_rejected() {
        let settings = ExportSettings {
            dir: std::env::temp_dir(),
            prefix: "Empty".to_owned(),
        };
        assert!(matches!(
            save_png(&RgbaImage::new(0, 5), &settings, 1),
            Err(ExportError::EmptyCanvas)
        ));
        assert!(matches!(
            Exporter::new().start(RgbaImage::new(5, 0), settings),
            Err(ExportError::EmptyCanvas)
        ));
    }

    #[test]
    fn test_zero_sized_snapshot() {
        let canvas = StrokeCanvas::default();
        let mut cache = LayerCache::new();
        let result = snapshot(&canvas, &mut cache, None, Vec2::new(0.0, 100.0), 1.0);
        assert!(matches!(result, Err(ExportError::EmptyCanvas)));
    }

    #[test]
    fn test_nothing_to_share() {
        struct Never;
        impl ShareSink for Never {
            fn share(&mut self, _image: &ExportedImage) -> Result<(), ExportError> {
                panic!("nothing should be shared");
            }
        }
        let exporter = Exporter::new();
        assert!(matches!(exporter.share_last(&mut Never), Err(ExportError::NothingToShare)));
    }
}
