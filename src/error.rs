use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use outline_tracer::OutlineError;

#[derive(thiserror::Error, Debug)]
pub enum BitmapFontError {
    #[error("Sub-process error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("Configuration parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Outline error: {0}")]
    OutlineError(#[from] OutlineError),
    #[error("Sheet {path:?} is {width}x{height} px, which is not a multiple of the {cell_width}x{cell_height} glyph cell")]
    SheetDimensions {
        path: PathBuf,
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
    },
    #[error("Cannot derive a start code point from sheet {0:?}; name it like `0x20.png` or set `start` explicitly")]
    InvalidStartCodePoint(PathBuf),
    #[error("{} glyph(s) failed: {}", .0.len(), GlyphFailures(.0))]
    GlyphFailures(Vec<GlyphFailure>),
    #[error("Unable to run font compiler `{program}`: {source}")]
    CompilerNotRunnable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Font compiler `{program}` exited with {status}: {stderr}")]
    ExternalCompilerFailure {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// A glyph that could not be outlined, kept so a whole batch can be reported at once.
#[derive(Debug)]
pub struct GlyphFailure {
    pub code_point: u32,
    pub error: OutlineError,
}

impl fmt::Display for GlyphFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X} ({})", self.code_point, self.error)
    }
}

struct GlyphFailures<'a>(&'a [GlyphFailure]);

impl fmt::Display for GlyphFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
