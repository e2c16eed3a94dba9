#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod input;
pub mod notify;
pub mod panels;
pub mod render;
pub mod stroke;
pub mod util;

pub use app::DrawingApp;
pub use canvas::StrokeCanvas;
pub use color::Color;
pub use compositor::{Background, BackgroundFit, compose};
pub use config::DrawingConfig;
pub use error::{BackgroundError, ConfigError, ExportError};
pub use export::{ExportedImage, Exporter, ShareSink};
pub use input::{Gesture, GestureTracker};
pub use render::{LayerCache, PaintTarget, PainterTarget, RasterTarget};
pub use stroke::{Stroke, StrokeRef, StrokeStyle};
