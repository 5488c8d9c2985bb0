//! # Bitmap Font Tools
//!
//! Tools for building outline fonts from sheets of bitmap glyphs.
//!
//! A glyph sheet is an image holding a grid of equally sized cells, one glyph per cell,
//! numbered row by row from a start code point. Each cell is thresholded into a binary mask,
//! traced into closed contours and scaled onto a 1000 unit design grid by
//! [outline_tracer](outline_tracer). The results are collected into a [`FontBuild`], which
//! keeps them ordered by code point, and finally handed to [FontForge](https://fontforge.org)
//! as a build script plus one SVG outline per glyph.
//!
//! Outlining is a pure function of the glyph mask, so callers are free to spread it over as
//! many threads as they like; see the `build_bitmap_font` CLI for an example.

mod config;
mod error;
mod font_build;
mod script;
mod sheet;
mod tools;

// Re-export the tracer
pub use outline_tracer;

pub use crate::config::{parse_code_point, FontConfig, SheetSource};
pub use crate::error::{BitmapFontError, GlyphFailure};
pub use crate::font_build::{outline_glyph, FontBuild, FontBuildUnit};
pub use crate::script::{build_script, svg_document, write_build_files};
pub use crate::sheet::{GlyphCell, GlyphSheet};
pub use crate::tools::*;
