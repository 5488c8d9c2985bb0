use crate::OutlineError;

/// A binary glyph bitmap: every pixel is either foreground (ink) or background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    /// Row-major foreground flags.
    pixels: Vec<bool>,

    /// The width of the glyph in px.
    width: usize,

    /// The height of the glyph in px.
    height: usize,
}

impl Mask {
    /// Creates a new mask from row-major foreground flags.
    ///
    /// Both dimensions must be positive and must describe the input data.
    pub fn new(pixels: Vec<bool>, width: usize, height: usize) -> Result<Mask, OutlineError> {
        if width == 0 || height == 0 {
            return Err(OutlineError::InvalidMask { width, height });
        }

        let expected = width * height;
        if pixels.len() != expected {
            return Err(OutlineError::InvalidDataDimensions(expected, pixels.len()));
        }

        Ok(Mask {
            pixels,
            width,
            height,
        })
    }

    /// Creates a mask by evaluating `is_foreground(x, y)` for every pixel.
    ///
    /// This is the natural constructor for callers that sample a larger image, such as a cell
    /// of a glyph sheet.
    pub fn from_fn<F>(width: usize, height: usize, mut is_foreground: F) -> Result<Mask, OutlineError>
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(is_foreground(x, y));
            }
        }

        Mask::new(pixels, width, height)
    }

    /// Creates a mask from rows of text, where `#` marks a foreground pixel and any other
    /// character marks background. All rows must have the same length.
    pub fn from_rows(rows: &[&str]) -> Result<Mask, OutlineError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let pixels: Vec<bool> = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();

        Mask::new(pixels, width, rows.len())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The row-major foreground flags.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Whether the pixel at `(x, y)` is foreground. Everything outside the mask is background.
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    /// Signed lookup used while tracing, where neighbours of edge pixels fall outside the mask.
    pub(crate) fn is_foreground_signed(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && self.is_foreground(x as usize, y as usize)
    }

    /// True when the mask contains no foreground pixels at all (e.g. a space).
    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }
}
