extern crate bitmap_font_tools;

use std::path::Path;

use bitmap_font_tools::{
    collect_cells, generate_font, load_sheets, outline_glyph, write_build_files,
    BitmapFontError, FontBuild, FontBuildUnit, FontConfig, SheetSource,
};
use image::{Rgb, RgbImage};
use tempfile::{tempdir, TempDir};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Draws a 5x5 cell at `column` of `image`: a ring if `ring` is set, otherwise nothing.
fn draw_cell(image: &mut RgbImage, column: u32, ring: bool) {
    if !ring {
        return;
    }
    for y in 0..5 {
        for x in 0..5 {
            if x == 0 || y == 0 || x == 4 || y == 4 {
                image.put_pixel(column * 5 + x, y, BLACK);
            }
        }
    }
}

/// Writes two sheets: `0x41.png` holding a ring and a blank cell, and `latin.png` holding a
/// ring at U+0042 (shadowed by the first sheet) and a ring at U+0043.
async fn write_sheets(dir: &Path) -> Vec<SheetSource> {
    let mut first = RgbImage::from_pixel(10, 5, WHITE);
    draw_cell(&mut first, 0, true);
    draw_cell(&mut first, 1, false);
    first.save(dir.join("0x41.png")).expect("Unable to write sheet");

    let mut second = RgbImage::from_pixel(10, 5, WHITE);
    draw_cell(&mut second, 0, true);
    draw_cell(&mut second, 1, true);
    second.save(dir.join("latin.png")).expect("Unable to write sheet");

    vec![
        SheetSource::new(dir.join("0x41.png")),
        SheetSource {
            path: dir.join("latin.png"),
            start: Some(0x42),
        },
    ]
}

fn config(dir: &Path, sheets: Vec<SheetSource>) -> FontConfig {
    FontConfig::new("Ring", "nobody", dir.join("ring.ttf"), 5, 5, sheets)
}

async fn build_units(config: &FontConfig) -> Vec<FontBuildUnit> {
    let sheets = load_sheets(config).await.expect("Unable to load sheets");
    let cells = collect_cells(&sheets, config.threshold).expect("Unable to slice sheets");
    let font = config.font_metrics().expect("Invalid metrics");

    let mut build = FontBuild::new();
    for cell in &cells {
        build.record(outline_glyph(cell.code_point, &cell.mask, &font));
    }
    build.finish().expect("Glyphs failed")
}

fn scratch_dir() -> TempDir {
    tempdir().expect("Unable to create scratch directory")
}

#[tokio::test]
async fn test_sheets_to_units() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, write_sheets(dir).await);
    let units = build_units(&config).await;

    let code_points: Vec<u32> = units.iter().map(|unit| unit.code_point).collect();
    assert_eq!(code_points, vec![0x41, 0x42, 0x43]);

    // U+0042 comes from the first sheet, where it is blank
    assert_eq!(units[1].path, None);
    assert_eq!(units[1].advance_width, 1000);

    let ring = units[0].path.as_ref().expect("Ring should have an outline");
    assert_eq!(ring.contours().len(), 2);
    assert_eq!(ring.advance_width, 1000);
    assert_eq!(units[2].path.as_ref().map(|p| p.contours().len()), Some(2));
}

#[tokio::test]
async fn test_write_build_files() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, write_sheets(dir).await);
    let units = build_units(&config).await;

    let output = dir.join("ring.ttf");
    let script_path = write_build_files(dir, &config, &units, &output)
        .await
        .expect("Unable to write build files");
    assert_eq!(script_path, dir.join("Ring.pe"));

    assert!(dir.join("0041.svg").exists());
    assert!(!dir.join("0042.svg").exists());
    assert!(dir.join("0043.svg").exists());

    let svg = tokio::fs::read_to_string(dir.join("0041.svg")).await.unwrap();
    assert!(svg.contains("M 0 0 L 1000 0 L 1000 1000 L 0 1000 Z\nM 200 200 L 200 800 L 800 800 L 800 200 Z"));

    let script = tokio::fs::read_to_string(&script_path).await.unwrap();
    let selects: Vec<&str> = script
        .lines()
        .filter(|line| line.starts_with("SelectSingletons"))
        .collect();
    assert_eq!(
        selects,
        vec![
            "SelectSingletons(UCodePoint(65))",
            "SelectSingletons(UCodePoint(66))",
            "SelectSingletons(UCodePoint(67))",
        ]
    );
    assert_eq!(script.matches("Import(").count(), 2);
    assert_eq!(script.matches("SetWidth(1000)").count(), 3);
    assert!(script.contains("ScaleToEm(1000, 0)"));
    assert!(script
        .trim_end()
        .ends_with(&format!("Generate(\"{}\")", output.display())));
}

#[cfg(unix)]
#[tokio::test]
async fn test_generate_font_runs_compiler() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, write_sheets(dir).await);
    let units = build_units(&config).await;

    // `true` accepts any arguments and succeeds, standing in for FontForge
    let output = generate_font(&config, &units, "true")
        .await
        .expect("Compiler should succeed");
    assert_eq!(output, dir.join("ring.ttf"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_compiler_failure_is_reported() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, write_sheets(dir).await);
    let units = build_units(&config).await;

    match generate_font(&config, &units, "false").await {
        Err(BitmapFontError::ExternalCompilerFailure {
            program, status, ..
        }) => {
            assert_eq!(program, "false");
            assert!(!status.success());
        }
        other => panic!("Expected a compiler failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sheet_with_wrong_size_is_rejected() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    RgbImage::from_pixel(12, 5, WHITE)
        .save(dir.join("0x20.png"))
        .unwrap();
    let config = config(dir, vec![SheetSource::new(dir.join("0x20.png"))]);

    assert!(matches!(
        load_sheets(&config).await,
        Err(BitmapFontError::SheetDimensions { width: 12, .. })
    ));
}

#[tokio::test]
async fn test_missing_sheet_is_an_error() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, vec![SheetSource::new(dir.join("0x20.png"))]);

    assert!(load_sheets(&config).await.is_err());
}

#[tokio::test]
async fn test_missing_compiler_is_named() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let config = config(dir, write_sheets(dir).await);
    let units = build_units(&config).await;

    match generate_font(&config, &units, "/definitely/not/a/compiler").await {
        Err(BitmapFontError::CompilerNotRunnable { program, .. }) => {
            assert_eq!(program, "/definitely/not/a/compiler");
        }
        other => panic!("Expected an unrunnable compiler, got {:?}", other),
    }
}
