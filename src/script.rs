//! Emits the FontForge build script and per-glyph SVG outlines for a font build.

use std::path::{Path, PathBuf};

use outline_tracer::{FontMetrics, ScaledPath};

use crate::{BitmapFontError, FontBuildUnit, FontConfig};

/// Quotes a string for use as a FontForge script literal.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// A standalone SVG document holding one glyph outline, filled with the nonzero rule.
pub fn svg_document(path: &ScaledPath, em: u32) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
            "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.0//EN\" \"http://www.w3.org/TR/SVG/DTD/svg10.dtd\">\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">",
            "<path d=\"{data}\" fill=\"currentColor\" fill-rule=\"nonzero\"/>",
            "</svg>\n"
        ),
        width = path.advance_width,
        height = em,
        data = path.to_path_data()
    )
}

/// Renders the FontForge script that assembles `units` into a font at `output`.
///
/// Font-wide settings come first, then one block per unit in the given order. Units with an
/// outline import `<artifact_dir>/<code point>.svg`; blank units only set their width.
pub fn build_script(
    config: &FontConfig,
    metrics: &FontMetrics,
    units: &[FontBuildUnit],
    artifact_dir: &Path,
    output: &Path,
) -> String {
    let name = quote(&config.name);
    let version = quote(&config.version);
    let mut script = String::new();

    script.push_str("New()\n");
    script.push_str(&format!(
        "SetFontNames({name}, {name}, {name}, {}, {}, {version})\n",
        quote(&config.weight),
        quote(&config.copyright),
    ));
    script.push_str(&format!("SetTTFName(0x409, 1, {name})\n"));
    script.push_str("SetTTFName(0x409, 2, \"Medium\")\n");
    script.push_str(&format!("SetTTFName(0x409, 4, {name})\n"));
    script.push_str(&format!("SetTTFName(0x409, 5, {version})\n"));
    script.push_str(&format!("SetTTFName(0x409, 6, {name})\n"));
    script.push_str(&format!(
        "ScaleToEm({}, {})\n",
        metrics.scaled_ascent(),
        metrics.scaled_descent()
    ));
    script.push_str("Reencode(\"unicodefull\")\n");

    for unit in units {
        script.push_str(&format!(
            "SelectSingletons(UCodePoint({}))\n",
            unit.code_point
        ));
        if let Some(artifact) = unit.artifact_name() {
            script.push_str(&format!(
                "Import({}, 0)\n",
                quote_path(&artifact_dir.join(artifact))
            ));
        }
        script.push_str(&format!("SetWidth({})\n", unit.advance_width));
        script.push_str("CanonicalStart()\n");
        script.push_str("CanonicalContours()\n");
    }

    script.push_str(&format!("Generate({})\n", quote_path(output)));
    script
}

/// Writes one SVG per outlined unit plus the build script into `dir`, returning the path of
/// the script.
pub async fn write_build_files(
    dir: &Path,
    config: &FontConfig,
    units: &[FontBuildUnit],
    output: &Path,
) -> Result<PathBuf, BitmapFontError> {
    let metrics = config.font_metrics()?;

    for unit in units {
        if let (Some(path), Some(artifact)) = (&unit.path, unit.artifact_name()) {
            tokio::fs::write(dir.join(artifact), svg_document(path, metrics.em)).await?;
        }
    }

    let script_path = dir.join(format!("{}.pe", config.name.replace(['/', '\\'], "_")));
    tokio::fs::write(
        &script_path,
        build_script(config, &metrics, units, dir, output),
    )
    .await?;

    Ok(script_path)
}
