//! This crate turns binary glyph bitmaps into vector outlines suitable for embedding in a
//! scalable font.
//!
//! Tracing works on the pixel grid itself rather than fitting curves: every edge between a
//! foreground and a background pixel becomes part of a closed, axis-aligned contour. Contours
//! are directed so that the foreground always lies on the same side, which makes outer
//! boundaries and holes wind in opposite directions. Filling the result with the nonzero (or
//! even-odd) rule reproduces the source bitmap exactly, and every traced glyph is checked
//! against that guarantee before it is returned.
//!
//! Pixels that only touch diagonally are treated as disconnected. This matches how most
//! bitmap fonts are drawn (a diagonal stroke in a checkerboard pattern stays a series of
//! separate squares) and keeps the result stable across runs.
//!
//! The traced contours are then scaled from px onto a font design grid (1000 units per em by
//! default) by [`outline_mask`], ready to be handed to a font compiler. This crate is used by
//! `bitmap_font_tools` to build TrueType fonts from glyph sheet images.

mod error;
pub use crate::error::OutlineError;

mod mask;
pub use crate::mask::Mask;

mod trace;
pub use crate::trace::*;

mod path;
pub use crate::path::*;
