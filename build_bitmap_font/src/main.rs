//! This binary crate provides a CLI utility for turning sheets of bitmap glyphs into a
//! TrueType font. It is a frontend to `bitmap_font_tools`: every cell of every sheet is traced
//! into vector outlines, and the outlines are compiled into a font by
//! [FontForge](https://fontforge.org).
//!
//! NOTE: This requires the `fontforge` executable to be on your `PATH` (or pass another
//! program with `--compiler`).
//!
//! ## Usage
//!
//! Sheets are PNG (or BMP/GIF) images holding a grid of `WIDTH` x `HEIGHT` px cells. The code
//! point of the top-left cell is taken from the file name, so `0x20.png` starts at the space
//! character, and cells are numbered row by row from there. Dark pixels are ink. A cell whose
//! pixel at (1, 1) is pure red is treated as missing.
//!
//! ```
//! $ build_bitmap_font -t teletext.ttf -n Teletext -c "Copyright nobody" 12 20 0x20.png 0xa0.png
//! ```
//!
//! Alternatively, all settings can be read from a JSON file (see `FontConfig` for the format):
//!
//! ```
//! $ build_bitmap_font --config teletext.json
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use bitmap_font_tools::outline_tracer::FontMetrics;
use bitmap_font_tools::{
    collect_cells, generate_font, load_sheets, outline_glyph, BitmapFontError, FontBuild,
    FontBuildUnit, FontConfig, GlyphCell, GlyphFailure, SheetSource, DEFAULT_COMPILER,
};
use clap::{
    command, crate_authors, crate_description, crate_version, value_parser, Arg, ArgMatches,
};
use spmc::{channel, Receiver};

static TOTAL_GLYPHS_OUTLINED: AtomicUsize = AtomicUsize::new(0);

/// A worker function that outlines glyph cells until it receives the end-of-work sentinel.
///
/// Results are sent back over `results` as soon as each glyph is done, so a glyph only becomes
/// visible to the collector once it is complete.
fn outline_worker(
    font: FontMetrics,
    rx: Receiver<Option<GlyphCell>>,
    results: mpsc::Sender<Result<FontBuildUnit, GlyphFailure>>,
) {
    while let Ok(Some(cell)) = rx.recv() {
        let result = outline_glyph(cell.code_point, &cell.mask, &font);
        if results.send(result).is_err() {
            // The collector is gone; nobody is waiting for more glyphs
            break;
        }
        TOTAL_GLYPHS_OUTLINED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Builds the font configuration from command line flags.
fn config_from_args(matches: &ArgMatches) -> FontConfig {
    let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    let sheets = matches
        .get_many::<String>("SHEETS")
        .map(|paths| paths.map(SheetSource::new).collect())
        .unwrap_or_default();

    let mut config = FontConfig::new(
        string("NAME"),
        string("COPYRIGHT"),
        PathBuf::from(string("TTF")),
        matches.get_one::<u32>("WIDTH").copied().unwrap_or_default(),
        matches.get_one::<u32>("HEIGHT").copied().unwrap_or_default(),
        sheets,
    );
    if let Some(weight) = matches.get_one::<String>("WEIGHT") {
        config.weight = weight.clone();
    }
    if let Some(version) = matches.get_one::<String>("FONT_VERSION") {
        config.version = version.clone();
    }
    config.ascent = matches.get_one::<u32>("ASCENT").copied();
    config.descent = matches.get_one::<u32>("DESCENT").copied();
    if let Some(&xscale) = matches.get_one::<f64>("XSCALE") {
        config.xscale = xscale;
    }
    if let Some(&yscale) = matches.get_one::<f64>("YSCALE") {
        config.yscale = yscale;
    }
    if let Some(&threshold) = matches.get_one::<u8>("THRESHOLD") {
        config.threshold = threshold;
    }

    config
}

/// Outlines every cell on a pool of worker threads and collects the results.
fn outline_cells(cells: Vec<GlyphCell>, font: FontMetrics) -> FontBuild {
    let (mut tx, rx) = channel();
    let (results_tx, results_rx) = mpsc::channel();
    let num_threads = num_cpus::get();
    log::info!("Starting {} worker threads...", num_threads);

    let join_handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let rx = rx.clone();
            let results_tx = results_tx.clone();
            thread::spawn(move || outline_worker(font, rx, results_tx))
        })
        .collect();
    // Only the workers hold senders now, so the results channel closes when they finish
    drop(results_tx);

    for cell in cells {
        tx.send(Some(cell))
            .expect("Unable to push job to thread worker");
    }

    for _ in 0..num_threads {
        // Sentinel value to signal the end of the work pool for each thread
        tx.send(None)
            .expect("Unable to push completion job to thread worker");
    }

    let mut build = FontBuild::new();
    for result in results_rx {
        build.record(result);
    }

    for handle in join_handles {
        handle.join().expect("Worker thread panicked");
    }

    build
}

fn run(matches: &ArgMatches) -> Result<(), BitmapFontError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut config = match matches.get_one::<String>("CONFIG") {
        Some(path) => runtime.block_on(FontConfig::from_file(path))?,
        None => {
            let config = config_from_args(matches);
            config.validate()?;
            config
        }
    };
    if matches.contains_id("KEEP") {
        config.keep = true;
    }
    let compiler = matches
        .get_one::<String>("COMPILER")
        .map_or(DEFAULT_COMPILER, String::as_str);

    let sheets = runtime.block_on(load_sheets(&config))?;
    let cells = collect_cells(&sheets, config.threshold)?;
    let font = config.font_metrics()?;
    log::info!(
        "Found {} glyph(s) in {} sheet(s)",
        cells.len(),
        sheets.len()
    );

    let outline_start = Instant::now();
    let units = outline_cells(cells, font).finish()?;

    let total_glyphs_outlined = TOTAL_GLYPHS_OUTLINED.load(Ordering::Relaxed);
    let outline_duration = outline_start.elapsed();
    if total_glyphs_outlined > 0 {
        let duration_per_glyph = outline_duration / total_glyphs_outlined as u32;

        log::info!(
            "Outlined {} glyph(s) in {:?} ({:?}/glyph)",
            total_glyphs_outlined,
            outline_duration,
            duration_per_glyph
        );
    }

    let output = runtime.block_on(generate_font(&config, &units, compiler))?;
    log::info!("Generated {}", output.display());

    Ok(())
}

fn main() {
    // Use "info" logging level by default.
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let matches = command!()
        .author(crate_authors!())
        .version(crate_version!())
        .before_help(crate_description!())
        .arg(Arg::new("CONFIG")
            .help("Reads all font settings from a JSON file instead of the command line. Only --keep and --compiler still apply.")
            .short('C')
            .long("config")
            .takes_value(true))
        .arg(Arg::new("WIDTH")
            .help("Width of a glyph cell in px")
            .required_unless_present("CONFIG")
            .value_parser(value_parser!(u32))
            .index(1))
        .arg(Arg::new("HEIGHT")
            .help("Height of a glyph cell in px")
            .required_unless_present("CONFIG")
            .value_parser(value_parser!(u32))
            .index(2))
        .arg(Arg::new("SHEETS")
            .help("Glyph sheet images. The file name is the code point of the first cell, e.g. 0x20.png")
            .required_unless_present("CONFIG")
            .multiple_values(true)
            .index(3))
        .arg(Arg::new("TTF")
            .help("Name of the output file")
            .short('t')
            .long("ttf")
            .required_unless_present("CONFIG")
            .takes_value(true))
        .arg(Arg::new("NAME")
            .help("The actual name of the font face")
            .short('n')
            .long("name")
            .required_unless_present("CONFIG")
            .takes_value(true))
        .arg(Arg::new("WEIGHT")
            .help("The weight of the font [default: Medium]")
            .short('w')
            .long("weight")
            .takes_value(true))
        .arg(Arg::new("COPYRIGHT")
            .help("The copyright string of the font")
            .short('c')
            .long("copyright")
            .required_unless_present("CONFIG")
            .takes_value(true))
        .arg(Arg::new("FONT_VERSION")
            .help("The version string of the font [default: 0.0.1]")
            .short('v')
            .long("font-version")
            .takes_value(true))
        .arg(Arg::new("KEEP")
            .help("Keep intermediate files")
            .short('k')
            .long("keep")
            .takes_value(false))
        .arg(Arg::new("ASCENT")
            .help("Override the ascent, which defaults to the cell height")
            .short('a')
            .long("ascent")
            .value_parser(value_parser!(u32))
            .takes_value(true))
        .arg(Arg::new("DESCENT")
            .help("Override the descent, which defaults to zero")
            .short('d')
            .long("descent")
            .value_parser(value_parser!(u32))
            .takes_value(true))
        .arg(Arg::new("XSCALE")
            .help("Horizontal scale; glyphs are stretched by xscale / yscale")
            .short('x')
            .long("xscale")
            .value_parser(value_parser!(f64))
            .takes_value(true))
        .arg(Arg::new("YSCALE")
            .help("Vertical scale")
            .short('y')
            .long("yscale")
            .value_parser(value_parser!(f64))
            .takes_value(true))
        .arg(Arg::new("THRESHOLD")
            .help("Pixels darker than this luminance (0-255) are ink [default: 128]")
            .long("threshold")
            .value_parser(value_parser!(u8))
            .takes_value(true))
        .arg(Arg::new("COMPILER")
            .help("The font compiler to run on the generated script [default: fontforge]")
            .long("compiler")
            .takes_value(true))
        .get_matches();

    if let Err(e) = run(&matches) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
