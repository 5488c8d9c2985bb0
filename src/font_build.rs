use std::collections::BTreeMap;

use outline_tracer::{outline_mask, FontMetrics, GlyphOutline, Mask, ScaledPath};

use crate::{BitmapFontError, GlyphFailure};

/// Everything the font compiler needs to know about one code point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontBuildUnit {
    pub code_point: u32,

    /// The outline in font units; absent for blank glyphs such as a space.
    pub path: Option<ScaledPath>,

    /// The horizontal advance in font units. Blank glyphs still take up space.
    pub advance_width: u32,
}

impl FontBuildUnit {
    pub fn from_outline(code_point: u32, outline: GlyphOutline) -> FontBuildUnit {
        FontBuildUnit {
            code_point,
            path: outline.path,
            advance_width: outline.advance_width,
        }
    }

    /// File name of the outline artifact for this glyph, if it has an outline.
    pub fn artifact_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .map(|_| format!("{:04x}.svg", self.code_point))
    }
}

/// Traces and scales a single glyph. This is a pure function, so glyphs can be outlined on
/// as many threads as are available.
pub fn outline_glyph(
    code_point: u32,
    mask: &Mask,
    font: &FontMetrics,
) -> Result<FontBuildUnit, GlyphFailure> {
    match outline_mask(mask, font) {
        Ok(outline) => Ok(FontBuildUnit::from_outline(code_point, outline)),
        Err(error) => Err(GlyphFailure { code_point, error }),
    }
}

/// Collects per-glyph results into the ordered set of build units for one font.
///
/// Units are kept sorted by code point regardless of the order in which they arrive, so
/// results from parallel workers can be inserted as they complete. Failed glyphs are kept
/// alongside so the whole batch can be reported at once.
#[derive(Debug, Default)]
pub struct FontBuild {
    units: BTreeMap<u32, FontBuildUnit>,
    failures: Vec<GlyphFailure>,
}

impl FontBuild {
    pub fn new() -> FontBuild {
        FontBuild::default()
    }

    /// Adds a finished glyph. If the code point is already present, the existing unit is
    /// kept and `false` is returned.
    pub fn insert(&mut self, unit: FontBuildUnit) -> bool {
        if self.units.contains_key(&unit.code_point) {
            log::warn!(
                "U+{:04X} was already built; ignoring the duplicate",
                unit.code_point
            );
            return false;
        }

        self.units.insert(unit.code_point, unit);
        true
    }

    /// Adds the result of [`outline_glyph`], whether it succeeded or not.
    pub fn record(&mut self, result: Result<FontBuildUnit, GlyphFailure>) {
        match result {
            Ok(unit) => {
                log::debug!(
                    "U+{:04X}: {} contour(s), advance width {}",
                    unit.code_point,
                    unit.path.as_ref().map_or(0, |path| path.contours().len()),
                    unit.advance_width
                );
                self.insert(unit);
            }
            Err(failure) => {
                log::error!("Failed to outline {failure}");
                self.failures.push(failure);
            }
        }
    }

    /// Moves everything from `other` into this build, with the same rules as [`Self::insert`].
    pub fn merge(&mut self, other: FontBuild) {
        for unit in other.units.into_values() {
            self.insert(unit);
        }
        self.failures.extend(other.failures);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, code_point: u32) -> Option<&FontBuildUnit> {
        self.units.get(&code_point)
    }

    /// The finished units in ascending code point order.
    pub fn units(&self) -> impl Iterator<Item = &FontBuildUnit> {
        self.units.values()
    }

    pub fn failures(&self) -> &[GlyphFailure] {
        &self.failures
    }

    /// Returns the ordered units, or every failure (sorted by code point) if any glyph failed.
    pub fn finish(self) -> Result<Vec<FontBuildUnit>, BitmapFontError> {
        if !self.failures.is_empty() {
            let mut failures = self.failures;
            failures.sort_by_key(|failure| failure.code_point);
            return Err(BitmapFontError::GlyphFailures(failures));
        }

        Ok(self.units.into_values().collect())
    }
}
