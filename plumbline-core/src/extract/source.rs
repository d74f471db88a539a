use image::RgbImage;

use crate::{error::PlumblineError, geometry::bbox::Bbox};

/// A word-level token from a page's vector text layer, with its exact
/// bounding box in page points (top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: Bbox,
}

/// Document adapter consumed by the extraction strategies.
///
/// Yields, per page index, either the native word tokens or a raster frame
/// for OCR. Parsing and rendering internals stay behind this seam so the
/// pipeline can be driven by an in-memory source in tests.
pub trait SheetSource {
    fn page_count(&self) -> usize;

    /// Word tokens from the machine-readable text layer. An empty result is
    /// valid and signals a scanned page to the fallback policy.
    fn words(&self, page: usize) -> Result<Vec<Word>, PlumblineError>;

    /// The page rendered at the given resolution, for the OCR path.
    fn rasterize(&self, page: usize, dpi: f32) -> Result<RgbImage, PlumblineError>;
}
