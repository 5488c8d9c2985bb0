use std::path::{Path, PathBuf};

use image::{Pixel, Rgb, RgbImage};
use outline_tracer::{Mask, OutlineError};

use crate::{BitmapFontError, SheetSource};

/// Cells whose pixel at (1, 1) has exactly this colour hold no glyph.
const MISSING_GLYPH_MARKER: Rgb<u8> = Rgb([255, 0, 0]);

/// A single glyph cut out of a sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    pub code_point: u32,
    pub mask: Mask,
}

/// An image holding a grid of equally sized glyph cells, numbered row by row from a start
/// code point.
#[derive(Clone, Debug)]
pub struct GlyphSheet {
    path: PathBuf,
    image: RgbImage,
    start: u32,
    cell_width: u32,
    cell_height: u32,
}

impl GlyphSheet {
    /// Wraps an already decoded image. The image must be an exact multiple of the cell size.
    pub fn from_image<P: Into<PathBuf>>(
        path: P,
        image: RgbImage,
        start: u32,
        cell_width: u32,
        cell_height: u32,
    ) -> Result<GlyphSheet, BitmapFontError> {
        let path = path.into();
        let (width, height) = image.dimensions();

        if cell_width == 0
            || cell_height == 0
            || width % cell_width != 0
            || height % cell_height != 0
        {
            return Err(BitmapFontError::SheetDimensions {
                path,
                width,
                height,
                cell_width,
                cell_height,
            });
        }

        Ok(GlyphSheet {
            path,
            image,
            start,
            cell_width,
            cell_height,
        })
    }

    /// Decodes the sheet image from disk. This blocks; see [`crate::load_sheets`] for the
    /// async version.
    pub fn open(
        source: &SheetSource,
        cell_width: u32,
        cell_height: u32,
    ) -> Result<GlyphSheet, BitmapFontError> {
        let start = source.start_code_point()?;
        let image = image::open(&source.path)?.to_rgb8();

        GlyphSheet::from_image(source.path.clone(), image, start, cell_width, cell_height)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn columns(&self) -> u32 {
        self.image.width() / self.cell_width
    }

    pub fn rows(&self) -> u32 {
        self.image.height() / self.cell_height
    }

    fn is_marked_missing(&self, left: u32, top: u32) -> bool {
        self.cell_width > 1
            && self.cell_height > 1
            && *self.image.get_pixel(left + 1, top + 1) == MISSING_GLYPH_MARKER
    }

    /// Cuts the sheet into glyph masks, in row-major order.
    ///
    /// A pixel is foreground when its luminance is below `threshold`. Cells flagged with the
    /// missing glyph marker and cells that would land on an invalid code point are skipped.
    pub fn cells(&self, threshold: u8) -> Result<Vec<GlyphCell>, OutlineError> {
        let columns = self.columns();
        let mut cells = Vec::new();

        for row in 0..self.rows() {
            for column in 0..columns {
                let code_point = u64::from(self.start) + u64::from(row * columns + column);
                let Some(code_point) = u32::try_from(code_point)
                    .ok()
                    .filter(|&c| char::from_u32(c).is_some())
                else {
                    log::warn!(
                        "Skipping cell ({column}, {row}) of {}: {code_point:#x} is not a valid code point",
                        self.path.display()
                    );
                    continue;
                };

                let (left, top) = (column * self.cell_width, row * self.cell_height);
                if self.is_marked_missing(left, top) {
                    log::warn!("U+{code_point:04X} is marked as missing; skipping");
                    continue;
                }

                let mask = Mask::from_fn(
                    self.cell_width as usize,
                    self.cell_height as usize,
                    |x, y| {
                        let pixel = self.image.get_pixel(left + x as u32, top + y as u32);
                        pixel.to_luma().0[0] < threshold
                    },
                )?;

                cells.push(GlyphCell { code_point, mask });
            }
        }

        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::{GlyphSheet, MISSING_GLYPH_MARKER};
    use crate::BitmapFontError;
    use image::{Rgb, RgbImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn test_sheet_must_be_multiple_of_cell() {
        let image = RgbImage::from_pixel(10, 8, WHITE);

        assert!(matches!(
            GlyphSheet::from_image("bad.png", image.clone(), 0x20, 3, 4),
            Err(BitmapFontError::SheetDimensions { width: 10, .. })
        ));
        assert!(matches!(
            GlyphSheet::from_image("bad.png", image, 0x20, 5, 0),
            Err(BitmapFontError::SheetDimensions { .. })
        ));
    }

    #[test]
    fn test_cells_are_numbered_row_major() {
        // 3 x 2 cells of 2x2 px; each cell gets a different number of ink pixels
        let mut image = RgbImage::from_pixel(6, 4, WHITE);
        image.put_pixel(2, 0, BLACK);
        image.put_pixel(0, 2, BLACK);
        image.put_pixel(1, 3, BLACK);

        let sheet = GlyphSheet::from_image("0x41.png", image, 0x41, 2, 2).unwrap();
        assert_eq!((sheet.columns(), sheet.rows()), (3, 2));

        let cells = sheet.cells(128).unwrap();
        let code_points: Vec<u32> = cells.iter().map(|cell| cell.code_point).collect();
        assert_eq!(code_points, vec![0x41, 0x42, 0x43, 0x44, 0x45, 0x46]);

        assert!(cells[0].mask.is_blank());
        assert!(cells[1].mask.is_foreground(0, 0));
        assert!(cells[3].mask.is_foreground(0, 0));
        assert!(cells[3].mask.is_foreground(1, 1));
        assert!(!cells[3].mask.is_foreground(1, 0));
    }

    #[test]
    fn test_threshold() {
        let image = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let sheet = GlyphSheet::from_image("0x20.png", image, 0x20, 2, 2).unwrap();

        assert!(sheet.cells(128).unwrap()[0].mask.is_foreground(1, 1));
        assert!(sheet.cells(50).unwrap()[0].mask.is_blank());
    }

    #[test]
    fn test_marked_cells_are_skipped() {
        let mut image = RgbImage::from_pixel(8, 4, WHITE);
        image.put_pixel(5, 1, MISSING_GLYPH_MARKER);

        let sheet = GlyphSheet::from_image("0x30.png", image, 0x30, 4, 4).unwrap();
        let cells = sheet.cells(128).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].code_point, 0x30);
    }

    #[test]
    fn test_invalid_code_points_are_skipped() {
        let image = RgbImage::from_pixel(4, 1, WHITE);
        let sheet = GlyphSheet::from_image("0xd7ff.png", image, 0xD7FF, 1, 1).unwrap();
        let code_points: Vec<u32> = sheet
            .cells(128)
            .unwrap()
            .into_iter()
            .map(|cell| cell.code_point)
            .collect();

        assert_eq!(code_points, vec![0xD7FF]);
    }
}
