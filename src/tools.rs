use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::task::spawn_blocking;

use crate::{
    write_build_files, BitmapFontError, FontBuildUnit, FontConfig, GlyphCell, GlyphSheet,
    SheetSource,
};

/// The font compiler invoked by [`generate_font`] unless told otherwise.
pub const DEFAULT_COMPILER: &str = "fontforge";

/// Loads a single glyph sheet from disk.
pub async fn load_sheet(
    source: SheetSource,
    cell_width: u32,
    cell_height: u32,
) -> Result<GlyphSheet, BitmapFontError> {
    // Note: image decoding is CPU bound as well as blocking, so it runs on the blocking pool
    // rather than through async file IO.
    spawn_blocking(move || GlyphSheet::open(&source, cell_width, cell_height)).await?
}

/// Loads every sheet named in `config` concurrently, preserving their order.
pub async fn load_sheets(config: &FontConfig) -> Result<Vec<GlyphSheet>, BitmapFontError> {
    try_join_all(
        config
            .sheets
            .iter()
            .cloned()
            .map(|source| load_sheet(source, config.cell_width, config.cell_height)),
    )
    .await
}

/// Cuts all sheets into glyph cells, ordered by code point.
///
/// The sheet order indicates precedence. If the same code point is encountered multiple
/// times, only the first will be used.
pub fn collect_cells(
    sheets: &[GlyphSheet],
    threshold: u8,
) -> Result<Vec<GlyphCell>, BitmapFontError> {
    let mut cells: BTreeMap<u32, GlyphCell> = BTreeMap::new();

    for sheet in sheets {
        for cell in sheet.cells(threshold)? {
            if cells.contains_key(&cell.code_point) {
                log::warn!(
                    "U+{:04X} in {} is already covered by an earlier sheet; skipping",
                    cell.code_point,
                    sheet.path().display()
                );
                continue;
            }
            cells.insert(cell.code_point, cell);
        }
    }

    Ok(cells.into_values().collect())
}

/// Runs the external font compiler on a build script.
///
/// The compiler is treated as a black box: its exit status is the only signal of success,
/// and its stderr is passed along when it fails.
pub async fn compile_font(program: &str, script: &Path) -> Result<(), BitmapFontError> {
    log::info!("Running {program} on {}", script.display());

    let output = Command::new(program)
        .arg("-script")
        .arg(script)
        .output()
        .await
        .map_err(|source| BitmapFontError::CompilerNotRunnable {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BitmapFontError::ExternalCompilerFailure {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Creates a fresh scratch directory for build scripts and outlines.
///
/// The directory is removed when the returned handle is dropped.
pub fn create_build_dir(prefix: &str) -> Result<TempDir, BitmapFontError> {
    Ok(tempfile::Builder::new().prefix(prefix).tempdir()?)
}

/// Disposes of a scratch directory once the build is over, returning its path if it was kept.
///
/// A directory that cannot be removed is only logged, so it never hides the build result.
pub fn release_build_dir(dir: TempDir, keep: bool) -> Option<PathBuf> {
    if keep {
        let path = dir.into_path();
        log::info!("Kept build files in {}", path.display());
        return Some(path);
    }

    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        log::warn!("Unable to remove build files in {}: {e}", path.display());
    }
    None
}

/// Writes the build files for `units` and compiles them into `config.output` with `compiler`.
///
/// The scratch directory is removed afterwards unless `config.keep` is set. Returns the
/// absolute path of the generated font.
pub async fn generate_font(
    config: &FontConfig,
    units: &[FontBuildUnit],
    compiler: &str,
) -> Result<PathBuf, BitmapFontError> {
    let output = if config.output.is_absolute() {
        config.output.clone()
    } else {
        std::env::current_dir()?.join(&config.output)
    };

    let dir = create_build_dir("bitmap_font_tools")?;
    let result = match write_build_files(dir.path(), config, units, &output).await {
        Ok(script) => compile_font(compiler, &script).await,
        Err(e) => Err(e),
    };
    release_build_dir(dir, config.keep);

    result.map(|_| output)
}

#[cfg(test)]
mod tests {
    use super::{create_build_dir, release_build_dir};

    #[test]
    fn test_build_dir_is_removed_on_drop() {
        let dir = create_build_dir("bitmap_font_tools-test").unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("bitmap_font_tools-test"));

        // Leaving scope early, as a failed build would
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_release_build_dir() {
        let dir = create_build_dir("bitmap_font_tools-test").unwrap();
        let path = dir.path().to_path_buf();
        assert_eq!(release_build_dir(dir, false), None);
        assert!(!path.exists());

        let dir = create_build_dir("bitmap_font_tools-test").unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("kept.svg"), "<svg/>").unwrap();
        assert_eq!(release_build_dir(dir, true), Some(path.clone()));
        assert!(path.join("kept.svg").is_file());

        std::fs::remove_dir_all(&path).unwrap();
    }
}
