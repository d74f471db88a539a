use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use plumbline_core::{
    AnchorMap, ContinuityChecker, FallbackPolicy, KeywordSet, PdfiumSheetSource, ScanConfig,
    SheetScanner, SheetSource, TesseractEngine,
    consts::{DEFAULT_KEYWORDS, DEFAULT_MIN_CONFIDENCE, DEFAULT_OCR_DPI, DEFAULT_TOLERANCE},
    normalize, report,
};

#[derive(Parser)]
#[command(name = "verify")]
#[command(about = "Vertical continuity check for structural drawing sets")]
struct Args {
    #[arg(help = "Input PDF file path")]
    input: PathBuf,

    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Sheet indices to analyze, 0-based (example: 17,18,19)"
    )]
    pages: Vec<usize>,

    #[arg(
        short,
        long = "anchor",
        value_parser = parse_anchor,
        help = "Per-page origin as PAGE:X,Y (repeatable, example: 17:1980.36,1267.56)"
    )]
    anchors: Vec<(usize, f32, f32)>,

    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()),
        help = "Keyword substrings that mark a structural label"
    )]
    keywords: Vec<String>,

    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE, help = "Continuity tolerance in page points")]
    tolerance: f32,

    #[arg(long, default_value_t = DEFAULT_OCR_DPI, help = "Rasterization DPI for the OCR path")]
    dpi: f32,

    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE, help = "Minimum OCR confidence (0-100)")]
    min_confidence: f32,

    #[arg(long, value_enum, default_value_t = FallbackPolicy::NativeThenOcr, help = "Extraction strategy")]
    mode: FallbackPolicy,

    #[arg(long, help = "Per-page OCR budget in seconds")]
    ocr_budget: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Table, help = "Report format")]
    format: Format,

    #[arg(short, long, help = "Write the report here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, help = "List page previews and exit")]
    list_pages: bool,

    #[arg(long, help = "PDF password, if any")]
    password: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

fn parse_anchor(raw: &str) -> Result<(usize, f32, f32), String> {
    let (page, origin) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PAGE:X,Y, got `{raw}`"))?;
    let (x, y) = origin
        .split_once(',')
        .ok_or_else(|| format!("expected PAGE:X,Y, got `{raw}`"))?;

    Ok((
        page.trim().parse().map_err(|e| format!("bad page: {e}"))?,
        x.trim().parse().map_err(|e| format!("bad x: {e}"))?,
        y.trim().parse().map_err(|e| format!("bad y: {e}"))?,
    ))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = PdfiumSheetSource::open(&args.input, args.password.as_deref())
        .with_context(|| format!("opening {}", args.input.display()))?;
    info!(
        "loaded {}: {} pages",
        args.input.display(),
        source.page_count()
    );

    if args.list_pages {
        for page in 0..source.page_count() {
            let preview = source.page_preview(page, 50).unwrap_or_default();
            println!("[{page}] {preview}");
        }
        return Ok(());
    }

    if args.pages.is_empty() {
        bail!("no pages selected; pass --pages (use --list-pages to inspect the sheet set)");
    }

    let keywords = KeywordSet::new(&args.keywords);
    if keywords.is_empty() {
        bail!("keyword list is empty after normalization");
    }

    let mut anchors = AnchorMap::new();
    for &(page, x, y) in &args.anchors {
        anchors.set_anchor(page, x, y);
    }
    for &page in &args.pages {
        if !anchors.contains(page) {
            warn!(
                "page {} has no anchor; its raw coordinates are used as local ones",
                page
            );
        }
    }

    let engine = TesseractEngine::default();
    if args.mode != FallbackPolicy::NativeOnly {
        engine.probe().context("probing the OCR engine")?;
    }

    let config = ScanConfig {
        keywords,
        policy: args.mode,
        ocr_dpi: args.dpi,
        min_confidence: args.min_confidence,
        ocr_page_budget: args.ocr_budget.map(Duration::from_secs),
    };
    let scanner = SheetScanner::new(&source, Arc::new(engine), config);

    let scan = scanner.scan(&args.pages);
    info!(
        "extraction complete: {} labeled points on {} pages, {} warnings",
        scan.total_points(),
        scan.points.len(),
        scan.warnings.len()
    );
    for warning in &scan.warnings {
        warn!("page {}: {}", warning.page, warning.message);
    }

    let calibrated = normalize(&scan.points, &anchors);
    let verdicts = ContinuityChecker::new(args.tolerance).verify(&calibrated);
    info!("{} continuity verdicts", verdicts.len());

    let rendered = match args.format {
        Format::Table => report::render_table(&verdicts),
        Format::Csv => {
            let mut buf = Vec::new();
            report::write_csv(&mut buf, &verdicts)?;
            String::from_utf8(buf)?
        }
        Format::Json => {
            let mut buf = Vec::new();
            report::write_json(&mut buf, &verdicts)?;
            String::from_utf8(buf)?
        }
    };

    match &args.output {
        Some(path) => {
            report::save_report(path, &rendered)?;
            info!("report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
