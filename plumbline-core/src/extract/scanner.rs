use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::{
    error::PlumblineError,
    extract::{
        FallbackPolicy, KeywordSet, LabelExtractor, LabeledPoint, PageSet,
        native::NativeExtractor,
        ocr::{OcrEngine, OcrExtractor},
        source::SheetSource,
    },
};

/// Settings for one scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub keywords: KeywordSet,
    pub policy: FallbackPolicy,
    pub ocr_dpi: f32,
    pub min_confidence: f32,
    /// Wall-clock budget per page for OCR recognition; `None` means
    /// unbounded, the reference behavior.
    pub ocr_page_budget: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::default(),
            policy: FallbackPolicy::default(),
            ocr_dpi: crate::consts::DEFAULT_OCR_DPI,
            min_confidence: crate::consts::DEFAULT_MIN_CONFIDENCE,
            ocr_page_budget: None,
        }
    }
}

/// A per-page extraction failure that was recovered locally. The page
/// contributed zero points; the run carried on.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionWarning {
    pub page: usize,
    pub message: String,
}

/// Everything one scan produced: labeled points per requested page plus the
/// warnings explaining any coverage gaps.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub points: PageSet<LabeledPoint>,
    pub warnings: Vec<ExtractionWarning>,
}

impl ScanReport {
    pub fn total_points(&self) -> usize {
        self.points.values().map(Vec::len).sum()
    }
}

/// Drives label extraction over a set of pages, applying the fallback
/// policy per page and downgrading per-page failures to warnings.
pub struct SheetScanner<'a, S: SheetSource> {
    source: &'a S,
    native: NativeExtractor,
    ocr: OcrExtractor,
    config: ScanConfig,
}

impl<'a, S: SheetSource> SheetScanner<'a, S> {
    pub fn new(source: &'a S, engine: Arc<dyn OcrEngine>, config: ScanConfig) -> Self {
        let ocr = OcrExtractor::new(engine)
            .with_dpi(config.ocr_dpi)
            .with_min_confidence(config.min_confidence)
            .with_page_budget(config.ocr_page_budget);

        Self {
            source,
            native: NativeExtractor,
            ocr,
            config,
        }
    }

    /// Scans the requested pages. Every requested in-range page gets an
    /// entry in the result, empty when nothing was found or extraction
    /// failed; a failed page never aborts the others.
    pub fn scan(&self, pages: &[usize]) -> ScanReport {
        let mut points: PageSet<LabeledPoint> = BTreeMap::new();
        let mut warnings = Vec::new();

        for &page in pages {
            if points.contains_key(&page) {
                continue;
            }
            if page >= self.source.page_count() {
                warn!(
                    "page {} out of range, document has {} pages, skipping",
                    page,
                    self.source.page_count()
                );
                warnings.push(ExtractionWarning {
                    page,
                    message: format!(
                        "out of range, document has {} pages",
                        self.source.page_count()
                    ),
                });
                continue;
            }

            match self.scan_page(page) {
                Ok(page_points) => {
                    info!("page {}: {} labeled points", page, page_points.len());
                    points.insert(page, page_points);
                }
                Err(err) => {
                    warn!("extraction failed on page {}: {}", page, err);
                    warnings.push(ExtractionWarning {
                        page,
                        message: err.to_string(),
                    });
                    points.insert(page, Vec::new());
                }
            }
        }

        ScanReport { points, warnings }
    }

    fn scan_page(&self, page: usize) -> Result<Vec<LabeledPoint>, PlumblineError> {
        let keywords = &self.config.keywords;

        match self.config.policy {
            FallbackPolicy::NativeOnly => self.native.extract(self.source, page, keywords),
            FallbackPolicy::OcrOnly => self.ocr.extract(self.source, page, keywords),
            FallbackPolicy::NativeThenOcr => {
                let native_points = self.native.extract(self.source, page, keywords)?;
                if !native_points.is_empty() {
                    return Ok(native_points);
                }
                info!("page {}: empty text layer, falling back to OCR", page);
                self.ocr.extract(self.source, page, keywords)
            }
        }
    }
}
