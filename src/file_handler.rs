use std::path::{Path, PathBuf};

use crate::compositor::{Background, BackgroundFit};
use crate::error::BackgroundError;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Turns picked or dropped files into a canvas background.
pub struct FileHandler {
    fit: BackgroundFit,
}

impl FileHandler {
    pub fn new(fit: BackgroundFit) -> Self {
        Self { fit }
    }

    /// Take the first file dropped on the window this frame, if any.
    pub fn take_dropped_file(&self, ctx: &egui::Context) -> Option<egui::DroppedFile> {
        ctx.input(|i| i.raw.dropped_files.first().cloned())
    }

    /// Ask the user for an image with the native file dialog.
    pub fn pick_file(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Choose a background image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
    }

    /// Load a dropped file as a background.
    pub fn load_dropped(&self, file: &egui::DroppedFile) -> Result<Background, BackgroundError> {
        let name = display_name(file);
        if !is_image_file(file) {
            log::warn!("Dropped file is not a supported type: {name}");
            return Err(BackgroundError::Unsupported(name));
        }
        if let Some(bytes) = &file.bytes {
            log::info!("Loading background from memory: {name} ({} bytes)", bytes.len());
            self.load_bytes(bytes)
        } else if let Some(path) = &file.path {
            self.load_path(path)
        } else {
            log::warn!("Dropped file has no accessible data: {name}");
            Err(BackgroundError::Unsupported(name))
        }
    }

    pub fn load_path(&self, path: &Path) -> Result<Background, BackgroundError> {
        log::info!("Loading background from {}", path.display());
        let bytes = std::fs::read(path).map_err(|err| BackgroundError::io(path, err))?;
        self.load_bytes(&bytes)
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Background, BackgroundError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(BackgroundError::EmptyImage);
        }
        log::debug!("Decoded background: {}x{}", image.width(), image.height());
        Ok(Background::new(image, self.fit))
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_deref()
        .and_then(Path::extension)
        .map(|ext| ext.to_string_lossy().into_owned())
        .or_else(|| Path::new(&file.name).extension().map(|ext| ext.to_string_lossy().into_owned()));
    name.is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
