
use crate::{trace, Contour, ContourSet, GridPoint, Mask, OutlineError};

/// Height of the design grid every glyph is scaled onto.
pub const DEFAULT_EM: u32 = 1000;

/// Font-wide metrics shared by every glyph of a font.
///
/// For an explanation of ascent and descent, the
/// [FreeType tutorial](https://www.freetype.org/freetype2/docs/tutorial/step2.html) is a
/// fantastic reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    /// Height of the design grid in font units.
    pub em: u32,

    /// The typographical ascender, in source px.
    pub ascent: u32,

    /// The typographical descender (as a positive distance below the baseline), in source px.
    pub descent: u32,

    /// Horizontal pixel aspect ratio. Values above 1 widen every glyph.
    pub par: f64,
}

impl FontMetrics {
    /// Creates metrics on the default 1000 unit design grid.
    pub fn new(ascent: u32, descent: u32, par: f64) -> Result<FontMetrics, OutlineError> {
        FontMetrics::with_em(DEFAULT_EM, ascent, descent, par)
    }

    pub fn with_em(
        em: u32,
        ascent: u32,
        descent: u32,
        par: f64,
    ) -> Result<FontMetrics, OutlineError> {
        if em == 0 {
            return Err(OutlineError::InvalidMetrics(String::from(
                "the em size must be positive",
            )));
        }
        if u64::from(ascent) + u64::from(descent) == 0 {
            return Err(OutlineError::InvalidMetrics(String::from(
                "ascent + descent must be positive",
            )));
        }
        if !par.is_finite() || par <= 0.0 {
            return Err(OutlineError::InvalidMetrics(format!(
                "the pixel aspect ratio must be a positive number, but {par} was provided"
            )));
        }

        Ok(FontMetrics {
            em,
            ascent,
            descent,
            par,
        })
    }

    /// Factor converting source px into font units: `em / (ascent + descent)`.
    pub fn scale(&self) -> f64 {
        f64::from(self.em) / (f64::from(self.ascent) + f64::from(self.descent))
    }

    /// The ascender in font units, truncated.
    pub fn scaled_ascent(&self) -> u32 {
        (f64::from(self.ascent) * self.scale()) as u32
    }

    /// The descender in font units, truncated.
    pub fn scaled_descent(&self) -> u32 {
        (f64::from(self.descent) * self.scale()) as u32
    }
}

/// Per-glyph metrics: the size of the source mask plus the font it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    /// The width of the glyph mask in px.
    pub width: usize,

    /// The height of the glyph mask in px.
    pub height: usize,

    pub font: FontMetrics,
}

impl GlyphMetrics {
    pub fn new(width: usize, height: usize, font: FontMetrics) -> Result<GlyphMetrics, OutlineError> {
        if width == 0 || height == 0 {
            return Err(OutlineError::InvalidMask { width, height });
        }

        Ok(GlyphMetrics {
            width,
            height,
            font,
        })
    }

    pub fn for_mask(mask: &Mask, font: FontMetrics) -> GlyphMetrics {
        GlyphMetrics {
            width: mask.width(),
            height: mask.height(),
            font,
        }
    }

    /// Horizontal space the glyph occupies: `trunc(par * width * em / height)`.
    ///
    /// This depends only on the mask size, `par` and `em`; ascent and descent play no part.
    pub fn advance_width(&self) -> u32 {
        (self.font.par * self.width as f64 * f64::from(self.font.em) / self.height as f64) as u32
    }

    /// Maps a pixel grid point into font units. Both axes are scaled by `em / height` and
    /// truncated toward zero; `x` is additionally stretched by `par`.
    pub fn to_design(&self, point: GridPoint) -> DesignPoint {
        let em = u64::from(self.font.em);
        let x = self.font.par * f64::from(point.x) * em as f64 / self.height as f64;
        let y = u64::from(point.y) * em / self.height as u64;

        DesignPoint {
            x: x as i32,
            y: i32::try_from(y).unwrap_or(i32::MAX),
        }
    }
}

/// A point in font units on the design grid. `y` grows downward, with the top of the mask at 0
/// and its bottom at `em`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DesignPoint {
    pub x: i32,
    pub y: i32,
}

impl DesignPoint {
    pub const fn new(x: i32, y: i32) -> DesignPoint {
        DesignPoint { x, y }
    }
}

/// A single drawing operation of an outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCommand {
    MoveTo(DesignPoint),
    LineTo(DesignPoint),
    Close,
}

/// A glyph outline in font units, ready to be embedded in a font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaledPath {
    contours: Vec<Vec<DesignPoint>>,

    /// The horizontal advance of the glyph in font units.
    pub advance_width: u32,
}

impl ScaledPath {
    pub fn contours(&self) -> &[Vec<DesignPoint>] {
        &self.contours
    }

    /// The outline as move/line/close operations, one closed subpath per contour.
    pub fn commands(&self) -> impl Iterator<Item = PathCommand> + '_ {
        self.contours.iter().flat_map(|contour| {
            contour
                .iter()
                .enumerate()
                .map(|(i, &point)| {
                    if i == 0 {
                        PathCommand::MoveTo(point)
                    } else {
                        PathCommand::LineTo(point)
                    }
                })
                .chain(std::iter::once(PathCommand::Close))
        })
    }

    /// Serialises the outline as SVG path data, e.g. `M 0 0 L 10 0 L 10 10 Z`, with one
    /// contour per line.
    pub fn to_path_data(&self) -> String {
        let mut data = String::new();
        for command in self.commands() {
            match command {
                PathCommand::MoveTo(p) => {
                    if !data.is_empty() {
                        data.push('\n');
                    }
                    data.push_str(&format!("M {} {} ", p.x, p.y));
                }
                PathCommand::LineTo(p) => data.push_str(&format!("L {} {} ", p.x, p.y)),
                PathCommand::Close => data.push('Z'),
            }
        }
        data
    }
}

fn scale_contour(contour: &Contour, metrics: &GlyphMetrics) -> Vec<DesignPoint> {
    contour
        .points()
        .iter()
        .map(|&point| metrics.to_design(point))
        .collect()
}

/// Scales traced contours into font units.
///
/// Returns `None` for an empty contour set: blank glyphs have no outline, although they still
/// have an advance width (see [`GlyphMetrics::advance_width`]).
pub fn assemble(contours: &ContourSet, metrics: &GlyphMetrics) -> Option<ScaledPath> {
    if contours.is_empty() {
        return None;
    }

    Some(ScaledPath {
        contours: contours
            .iter()
            .map(|contour| scale_contour(contour, metrics))
            .collect(),
        advance_width: metrics.advance_width(),
    })
}

/// The finished outline of a single glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphOutline {
    /// The scaled outline, absent for blank glyphs.
    pub path: Option<ScaledPath>,

    /// The horizontal advance of the glyph in font units.
    pub advance_width: u32,
}

/// Traces `mask` and scales the result onto the design grid of `font`.
pub fn outline_mask(mask: &Mask, font: &FontMetrics) -> Result<GlyphOutline, OutlineError> {
    let metrics = GlyphMetrics::for_mask(mask, *font);
    let contours = trace(mask)?;

    Ok(GlyphOutline {
        path: assemble(&contours, &metrics),
        advance_width: metrics.advance_width(),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        assemble, outline_mask, DesignPoint, FontMetrics, GlyphMetrics, PathCommand,
    };
    use crate::{trace, GridPoint, Mask, OutlineError};

    fn font() -> FontMetrics {
        FontMetrics::new(800, 200, 1.0).unwrap()
    }

    fn ring_10x10() -> Mask {
        Mask::from_fn(10, 10, |x, y| !((3..7).contains(&x) && (3..7).contains(&y))).unwrap()
    }

    #[test]
    fn test_font_metrics_validation() {
        assert!(matches!(
            FontMetrics::new(0, 0, 1.0),
            Err(OutlineError::InvalidMetrics(_))
        ));
        assert!(matches!(
            FontMetrics::new(10, 2, 0.0),
            Err(OutlineError::InvalidMetrics(_))
        ));
        assert!(matches!(
            FontMetrics::new(10, 2, f64::NAN),
            Err(OutlineError::InvalidMetrics(_))
        ));
        assert!(matches!(
            FontMetrics::with_em(0, 10, 2, 1.0),
            Err(OutlineError::InvalidMetrics(_))
        ));
    }

    #[test]
    fn test_font_scale() {
        let font = font();
        assert_eq!(font.scale(), 1.0);
        assert_eq!(font.scaled_ascent(), 800);
        assert_eq!(font.scaled_descent(), 200);

        let font = FontMetrics::new(12, 4, 1.0).unwrap();
        assert_eq!(font.scale(), 62.5);
        assert_eq!(font.scaled_ascent(), 750);
        assert_eq!(font.scaled_descent(), 250);
    }

    #[test]
    fn test_vertical_scale_maps_mask_onto_em() {
        let metrics = GlyphMetrics::new(50, 100, font()).unwrap();

        assert_eq!(metrics.to_design(GridPoint::new(0, 0)), DesignPoint::new(0, 0));
        assert_eq!(metrics.to_design(GridPoint::new(0, 100)).y, 1000);
        assert_eq!(metrics.to_design(GridPoint::new(50, 50)), DesignPoint::new(500, 500));
    }

    #[test]
    fn test_scaling_truncates() {
        let metrics = GlyphMetrics::new(3, 3, font()).unwrap();

        assert_eq!(metrics.to_design(GridPoint::new(1, 1)), DesignPoint::new(333, 333));
        assert_eq!(metrics.to_design(GridPoint::new(2, 2)), DesignPoint::new(666, 666));
        assert_eq!(metrics.to_design(GridPoint::new(3, 3)), DesignPoint::new(1000, 1000));
        assert_eq!(metrics.advance_width(), 1000);
    }

    #[test]
    fn test_aspect_ratio_only_stretches_x() {
        let font = FontMetrics::new(8, 0, 0.5).unwrap();
        let metrics = GlyphMetrics::new(8, 8, font).unwrap();

        assert_eq!(metrics.to_design(GridPoint::new(8, 8)), DesignPoint::new(500, 1000));
        assert_eq!(metrics.advance_width(), 500);
    }

    #[test]
    fn test_advance_width_ignores_ascent_and_descent() {
        let a = GlyphMetrics::new(7, 9, FontMetrics::new(9, 0, 1.25).unwrap()).unwrap();
        let b = GlyphMetrics::new(7, 9, FontMetrics::new(3, 40, 1.25).unwrap()).unwrap();

        assert_eq!(a.advance_width(), 972);
        assert_eq!(a.advance_width(), b.advance_width());
        assert_eq!(a.advance_width(), a.advance_width());
    }

    #[test]
    fn test_large_masks_do_not_overflow() {
        let metrics = GlyphMetrics::new(4096, 4096, font()).unwrap();

        assert_eq!(
            metrics.to_design(GridPoint::new(4096, 4096)),
            DesignPoint::new(1000, 1000)
        );

        let tall = GlyphMetrics::new(4096, 1, font()).unwrap();
        assert_eq!(tall.advance_width(), 4_096_000);
        assert_eq!(tall.to_design(GridPoint::new(4096, 1)), DesignPoint::new(4_096_000, 1000));
    }

    #[test]
    fn test_zero_sized_glyph_metrics_are_rejected() {
        assert!(matches!(
            GlyphMetrics::new(0, 10, font()),
            Err(OutlineError::InvalidMask { .. })
        ));
    }

    #[test]
    fn test_blank_glyph_keeps_advance_width() {
        let mask = Mask::from_fn(6, 12, |_, _| false).unwrap();
        let outline = outline_mask(&mask, &font()).unwrap();

        assert_eq!(outline.path, None);
        assert_eq!(outline.advance_width, 500);
    }

    #[test]
    fn test_ring_glyph_end_to_end() {
        let mask = ring_10x10();
        let outline = outline_mask(&mask, &font()).unwrap();
        let path = outline.path.unwrap();

        assert_eq!(outline.advance_width, 1000);
        assert_eq!(path.advance_width, 1000);
        assert_eq!(path.contours().len(), 2);
        assert_eq!(
            path.contours()[0],
            vec![
                DesignPoint::new(0, 0),
                DesignPoint::new(1000, 0),
                DesignPoint::new(1000, 1000),
                DesignPoint::new(0, 1000),
            ]
        );
        assert_eq!(
            path.contours()[1],
            vec![
                DesignPoint::new(300, 300),
                DesignPoint::new(300, 700),
                DesignPoint::new(700, 700),
                DesignPoint::new(700, 300),
            ]
        );
    }

    #[test]
    fn test_path_commands() {
        let mask = Mask::from_rows(&["#"]).unwrap();
        let metrics = GlyphMetrics::for_mask(&mask, font());
        let path = assemble(&trace(&mask).unwrap(), &metrics).unwrap();
        let commands: Vec<PathCommand> = path.commands().collect();

        assert_eq!(
            commands,
            vec![
                PathCommand::MoveTo(DesignPoint::new(0, 0)),
                PathCommand::LineTo(DesignPoint::new(1000, 0)),
                PathCommand::LineTo(DesignPoint::new(1000, 1000)),
                PathCommand::LineTo(DesignPoint::new(0, 1000)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_path_data() {
        let outline = outline_mask(&ring_10x10(), &font()).unwrap();

        assert_eq!(
            outline.path.unwrap().to_path_data(),
            "M 0 0 L 1000 0 L 1000 1000 L 0 1000 Z\nM 300 300 L 300 700 L 700 700 L 700 300 Z"
        );
    }
}
