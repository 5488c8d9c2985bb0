use std::path::{Path, PathBuf};

use outline_tracer::FontMetrics;
use serde::{Deserialize, Serialize};

use crate::BitmapFontError;

fn default_weight() -> String {
    String::from("Medium")
}

fn default_version() -> String {
    String::from("0.0.1")
}

fn default_scale() -> f64 {
    1.0
}

fn default_threshold() -> u8 {
    128
}

/// A glyph sheet image and the code point of its top-left cell.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SheetSource {
    pub path: PathBuf,

    /// The code point of the first cell. When absent, it is parsed from the file stem, so a
    /// sheet named `0x20.png` starts at U+0020.
    #[serde(default)]
    pub start: Option<u32>,
}

impl SheetSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> SheetSource {
        SheetSource {
            path: path.into(),
            start: None,
        }
    }

    /// The code point of the first cell of this sheet.
    pub fn start_code_point(&self) -> Result<u32, BitmapFontError> {
        if let Some(start) = self.start {
            return Ok(start);
        }

        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(parse_code_point)
            .ok_or_else(|| BitmapFontError::InvalidStartCodePoint(self.path.clone()))
    }
}

/// Parses an integer literal the way a source file would spell it: `0x` for hex, `0o` for
/// octal, `0b` for binary and plain decimal otherwise.
pub fn parse_code_point(literal: &str) -> Option<u32> {
    let literal = literal.trim();
    let lower = literal.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        (octal, 8)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        (binary, 2)
    } else {
        (lower.as_str(), 10)
    };

    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&code_point| char::from_u32(code_point).is_some())
}

/// Everything needed to build one font from a set of glyph sheets.
///
/// This is usually read from a JSON file:
///
/// ```json
/// {
///   "name": "Teletext",
///   "copyright": "Copyright (c) 2021",
///   "output": "teletext.ttf",
///   "cell_width": 12,
///   "cell_height": 20,
///   "xscale": 1.2,
///   "sheets": [{ "path": "0x20.png" }, { "path": "latin.png", "start": 160 }]
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FontConfig {
    /// The family name of the font face.
    pub name: String,

    #[serde(default = "default_weight")]
    pub weight: String,

    pub copyright: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Path of the generated font file.
    pub output: PathBuf,

    /// Overrides the ascent, which defaults to the cell height.
    #[serde(default)]
    pub ascent: Option<u32>,

    /// Overrides the descent, which defaults to zero.
    #[serde(default)]
    pub descent: Option<u32>,

    #[serde(default = "default_scale")]
    pub xscale: f64,

    #[serde(default = "default_scale")]
    pub yscale: f64,

    /// Keep the generated build script and outline files instead of deleting them.
    #[serde(default)]
    pub keep: bool,

    /// Pixels with a luminance below this value are ink.
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// The width of a glyph cell in px.
    pub cell_width: u32,

    /// The height of a glyph cell in px.
    pub cell_height: u32,

    pub sheets: Vec<SheetSource>,
}

impl FontConfig {
    /// Creates a configuration with default values for everything optional.
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        name: S,
        copyright: S,
        output: P,
        cell_width: u32,
        cell_height: u32,
        sheets: Vec<SheetSource>,
    ) -> FontConfig {
        FontConfig {
            name: name.into(),
            weight: default_weight(),
            copyright: copyright.into(),
            version: default_version(),
            output: output.into(),
            ascent: None,
            descent: None,
            xscale: default_scale(),
            yscale: default_scale(),
            keep: false,
            threshold: default_threshold(),
            cell_width,
            cell_height,
            sheets,
        }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(data: &[u8]) -> Result<FontConfig, BitmapFontError> {
        let config: FontConfig = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<FontConfig, BitmapFontError> {
        let data = tokio::fs::read(path).await?;
        FontConfig::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), BitmapFontError> {
        if self.name.trim().is_empty() {
            return Err(BitmapFontError::InvalidConfig(String::from(
                "the font name must not be empty",
            )));
        }
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(BitmapFontError::InvalidConfig(format!(
                "glyph cells must have a positive size, but {}x{} was provided",
                self.cell_width, self.cell_height
            )));
        }
        for (axis, scale) in [("xscale", self.xscale), ("yscale", self.yscale)] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(BitmapFontError::InvalidConfig(format!(
                    "{axis} must be a positive number, but {scale} was provided"
                )));
            }
        }
        if self.sheets.is_empty() {
            return Err(BitmapFontError::InvalidConfig(String::from(
                "at least one glyph sheet is required",
            )));
        }

        Ok(())
    }

    /// The horizontal pixel aspect ratio, `xscale / yscale`.
    pub fn par(&self) -> f64 {
        self.xscale / self.yscale
    }

    /// Font metrics derived from the cell size and any overrides.
    pub fn font_metrics(&self) -> Result<FontMetrics, BitmapFontError> {
        Ok(FontMetrics::new(
            self.ascent.unwrap_or(self.cell_height),
            self.descent.unwrap_or(0),
            self.par(),
        )?)
    }
}
