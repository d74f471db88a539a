use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use crate::{consts::DEFAULT_KEYWORDS, error::PlumblineError, geometry::bbox::Bbox};

pub mod native;
pub mod ocr;
pub mod pdfium;
pub mod scanner;
pub mod source;

/// Extraction output keyed by page index.
///
/// A page that was scanned but produced nothing (including pages whose
/// extraction failed and was downgraded to a warning) is present with an
/// empty vector; an index absent from the map was never scanned. The
/// continuity matcher relies on this distinction for its fail-fast
/// page-lookup contract.
pub type PageSet<T> = BTreeMap<usize, Vec<T>>;

/// One detected structural-element tag on a sheet.
///
/// `center` is derived from `bbox` exactly once, at extraction time, and is
/// the only geometry consumed downstream. The raw box is kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPoint {
    /// Zero-based page index of the sheet this tag was found on.
    pub page: usize,
    /// The matched token text, e.g. "COL-4" or "F30".
    pub label: String,
    /// Bounding-box center in page points.
    pub center: Vec2,
    /// Raw bounding box, page points for native tokens.
    pub bbox: Bbox,
}

impl LabeledPoint {
    pub fn new(page: usize, label: String, bbox: Bbox) -> Self {
        Self {
            page,
            label,
            center: bbox.center(),
            bbox,
        }
    }
}

/// Case-insensitive substring predicate deciding what counts as a
/// structural label.
///
/// Deliberately simple: a token is a label if its upper-cased text contains
/// any configured keyword. Element classification beyond this is out of
/// scope.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.keywords.iter().any(|key| upper.contains(key))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

/// How the scanner chooses between the two extraction strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FallbackPolicy {
    /// Vector text layer only. Scanned pages yield zero points.
    NativeOnly,
    /// Rasterize and OCR every page, even ones with a text layer.
    OcrOnly,
    /// Try the text layer first; an empty result signals a scanned page and
    /// triggers the OCR path.
    #[default]
    NativeThenOcr,
}

/// One extraction strategy. Both implementations return the same
/// `LabeledPoint` shape so calibration and matching stay mode-agnostic.
pub trait LabelExtractor<S: source::SheetSource> {
    fn extract(
        &self,
        source: &S,
        page: usize,
        keywords: &KeywordSet,
    ) -> Result<Vec<LabeledPoint>, PlumblineError>;
}
