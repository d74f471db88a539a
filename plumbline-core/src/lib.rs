pub mod calibrate;
pub mod consts;
pub mod continuity;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod report;

// Re-export commonly used types
pub use calibrate::{AnchorMap, CalibratedPoint, normalize};
pub use continuity::{Continuity, ContinuityChecker, ContinuityVerdict};
pub use error::PlumblineError;
pub use extract::{
    FallbackPolicy, KeywordSet, LabeledPoint, PageSet,
    ocr::{OcrEngine, TesseractEngine},
    pdfium::PdfiumSheetSource,
    scanner::{ScanConfig, ScanReport, SheetScanner},
    source::SheetSource,
};
