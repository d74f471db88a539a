/// PDF page-coordinate resolution, in points per inch.
///
/// All downstream geometry (calibration, continuity matching) runs in page
/// points. OCR operates on a raster at `DEFAULT_OCR_DPI`, so its pixel
/// coordinates are converted back with the factor `72 / dpi`.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Rasterization resolution used for the OCR extraction path.
///
/// 200 DPI is a practical floor for Tesseract on engineering drawings:
/// lower resolutions lose the thin strokes of small structural tags, higher
/// resolutions inflate render and recognition time with little accuracy gain.
pub const DEFAULT_OCR_DPI: f32 = 200.0;

/// Minimum OCR token confidence, on Tesseract's 0-100 scale.
///
/// Tokens scoring below this are discarded before keyword matching.
/// Vector-extracted text is exact and never confidence-filtered.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 40.0;

/// Maximum normalized distance, in page points, at which an element on the
/// lower sheet is considered to continue into the nearest element on the
/// upper sheet.
pub const DEFAULT_TOLERANCE: f32 = 20.0;

/// Keyword substrings that mark a word as a structural-element label.
///
/// Matched case-insensitively against extracted tokens. The defaults cover
/// column marks ("COL"), posts ("POST") and the footing schedule tags used
/// on foundation plans ("F30", "F35").
pub const DEFAULT_KEYWORDS: &[&str] = &["COL", "POST", "F30", "F35"];

/// Tesseract language pack used by the OCR engine.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Tesseract page segmentation mode. 3 = fully automatic layout analysis.
pub const DEFAULT_PAGE_SEGMENTATION_MODE: u32 = 3;

/// Environment variable holding the directory of the pdfium dynamic library.
pub const PDFIUM_LIB_PATH_ENV_NAME: &str = "PDFIUM_DYNAMIC_LIB_PATH";
