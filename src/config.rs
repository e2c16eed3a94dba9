use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::compositor::BackgroundFit;
use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DRAWING_PAD_CONFIG";
/// Config file looked up in the working directory when `CONFIG_ENV` is unset.
pub const CONFIG_FILE: &str = "drawing_pad.json";

/// A named palette entry. `tag` is a hex color such as `#FF0000`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    pub tag: String,
}

impl Swatch {
    fn new(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_owned(),
            tag: tag.to_owned(),
        }
    }

    pub fn color(&self) -> Result<Color, ConfigError> {
        self.tag
            .parse()
            .map_err(|err| ConfigError::Invalid(format!("swatch {:?}: {err}", self.name)))
    }
}

/// Thicknesses offered by the brush size dialog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushPresets {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl Default for BrushPresets {
    fn default() -> Self {
        Self {
            small: 5.0,
            medium: 12.0,
            large: 21.0,
        }
    }
}

impl BrushPresets {
    pub fn all(&self) -> [(&'static str, f32); 3] {
        [("Small", self.small), ("Medium", self.medium), ("Large", self.large)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub default_thickness: f32,
    pub brush_presets: BrushPresets,
    pub palette: Vec<Swatch>,
    /// Index into `palette` selected at startup.
    pub default_swatch: usize,
    pub export_dir: PathBuf,
    pub export_prefix: String,
    pub background_fit: BackgroundFit,
    pub toast_seconds: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_thickness: 5.0,
            brush_presets: BrushPresets::default(),
            palette: vec![
                Swatch::new("Skin", "#FFE0BD"),
                Swatch::new("Black", "#000000"),
                Swatch::new("Red", "#FF0000"),
                Swatch::new("Green", "#00C853"),
                Swatch::new("Blue", "#2962FF"),
                Swatch::new("Yellow", "#FFEB3B"),
                Swatch::new("Lollipop", "#FF69B4"),
                Swatch::new("White", "#FFFFFF"),
            ],
            default_swatch: 1,
            export_dir: default_export_dir(),
            export_prefix: "DrawingApp".to_owned(),
            background_fit: BackgroundFit::default(),
            toast_seconds: 3.5,
        }
    }
}

fn default_export_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Downloads"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl DrawingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `DRAWING_PAD_CONFIG`, else `drawing_pad.json` if present,
    /// else defaults. A broken file is logged and replaced by defaults.
    pub fn load_or_default() -> Self {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = PathBuf::from(CONFIG_FILE);
                if !path.exists() {
                    log::debug!("No {CONFIG_FILE}, using default config");
                    return Self::default();
                }
                path
            }
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::error!("{err}; using default config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let thicknesses = [
            ("default_thickness", self.default_thickness),
            ("brush_presets.small", self.brush_presets.small),
            ("brush_presets.medium", self.brush_presets.medium),
            ("brush_presets.large", self.brush_presets.large),
        ];
        for (name, value) in thicknesses {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette is empty".to_owned()));
        }
        for swatch in &self.palette {
            swatch.color()?;
        }
        if self.default_swatch >= self.palette.len() {
            return Err(ConfigError::Invalid(format!(
                "default_swatch {} out of range for {} swatches",
                self.default_swatch,
                self.palette.len()
            )));
        }
        if self.export_prefix.is_empty() || self.export_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "export_prefix {:?} is not a plain file name",
                self.export_prefix
            )));
        }
        if !(self.toast_seconds.is_finite() && self.toast_seconds > 0.0) {
            return Err(ConfigError::Invalid("toast_seconds must be positive".to_owned()));
        }
        Ok(())
    }

    /// Color of the startup swatch.
    pub fn default_color(&self) -> Color {
        self.palette
            .get(self.default_swatch)
            .and_then(|swatch| swatch.color().ok())
            .unwrap_or(Color::BLACK)
    }
}
