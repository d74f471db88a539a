use std::sync::{Arc, mpsc};
use std::time::Duration;

use image::RgbImage;
use leptess::{LepTess, Variable};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    consts::{
        DEFAULT_MIN_CONFIDENCE, DEFAULT_OCR_DPI, DEFAULT_OCR_LANGUAGE,
        DEFAULT_PAGE_SEGMENTATION_MODE, PDF_POINTS_PER_INCH,
    },
    error::{ImageEncodeSnafu, PlumblineError},
    extract::{KeywordSet, LabelExtractor, LabeledPoint, source::SheetSource},
    geometry::bbox::Bbox,
};

/// One recognized token, still in raster pixel coordinates (top-left
/// origin). Confidence is on Tesseract's 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub bbox: Bbox,
    pub confidence: f32,
}

/// Recognition engine seam. The extractor owns confidence filtering and
/// coordinate conversion; engines return every token they see.
///
/// Implementations must be shareable across threads so a recognition call
/// can run under a time budget on a worker thread.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, frame: &RgbImage) -> Result<Vec<OcrToken>, PlumblineError>;
}

/// Tesseract-backed engine via leptess.
///
/// Holds configuration only; a `LepTess` handle is created per call because
/// the handle is not `Sync` and recognition dominates setup cost anyway.
pub struct TesseractEngine {
    language: String,
    page_segmentation_mode: u32,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            page_segmentation_mode: DEFAULT_PAGE_SEGMENTATION_MODE,
        }
    }

    /// Fails early if the language pack is missing, so a misconfigured host
    /// surfaces before any page is rendered.
    pub fn probe(&self) -> Result<(), PlumblineError> {
        LepTess::new(None, &self.language).map_err(|e| PlumblineError::Ocr {
            stage: "init".to_string(),
            message: format!(
                "failed to initialize Tesseract with language '{}': {}",
                self.language, e
            ),
        })?;
        Ok(())
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_LANGUAGE)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, frame: &RgbImage) -> Result<Vec<OcrToken>, PlumblineError> {
        let mut tess = LepTess::new(None, &self.language).map_err(|e| PlumblineError::Ocr {
            stage: "init".to_string(),
            message: e.to_string(),
        })?;

        tess.set_variable(
            Variable::TesseditPagesegMode,
            &self.page_segmentation_mode.to_string(),
        )
        .map_err(|e| PlumblineError::Ocr {
            stage: "set-psm".to_string(),
            message: e.to_string(),
        })?;

        // leptess wants an encoded image; hand it the frame as in-memory PNG
        let mut png_buf = std::io::Cursor::new(Vec::new());
        frame
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .context(ImageEncodeSnafu {
                stage: "ocr-frame",
            })?;
        tess.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| PlumblineError::Ocr {
                stage: "set-image".to_string(),
                message: e.to_string(),
            })?;

        // None here means a blank frame, not a failure
        let boxes =
            match tess.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true) {
                Some(boxes) => boxes,
                None => return Ok(Vec::new()),
            };

        let mut tokens = Vec::new();
        for word_box in &boxes {
            let geometry = word_box.get_geometry();
            tess.set_rectangle(geometry.x, geometry.y, geometry.w, geometry.h);

            let text = tess.get_utf8_text().unwrap_or_default().trim().to_string();
            if text.is_empty() {
                continue;
            }
            let confidence = tess.mean_text_conf() as f32;

            debug!(
                "ocr token `{}` conf {} at ({}, {}, {}, {})",
                text, confidence, geometry.x, geometry.y, geometry.w, geometry.h
            );

            tokens.push(OcrToken {
                text,
                bbox: Bbox::new_from_min_size(
                    glam::Vec2::new(geometry.x as f32, geometry.y as f32),
                    glam::Vec2::new(geometry.w as f32, geometry.h as f32),
                ),
                confidence,
            });
        }

        Ok(tokens)
    }
}

/// OCR extraction strategy: rasterize the page, recognize tokens, drop
/// low-confidence ones, convert surviving boxes from pixels to page points
/// and keyword-match the result.
pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
    pub dpi: f32,
    pub min_confidence: f32,
    /// Optional wall-clock budget for one page's recognition. On timeout
    /// the worker thread is abandoned and the page counts as failed.
    pub page_budget: Option<Duration>,
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            dpi: DEFAULT_OCR_DPI,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            page_budget: None,
        }
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_page_budget(mut self, budget: Option<Duration>) -> Self {
        self.page_budget = budget;
        self
    }

    fn recognize(&self, page: usize, frame: RgbImage) -> Result<Vec<OcrToken>, PlumblineError> {
        match self.page_budget {
            None => self.engine.recognize(&frame),
            Some(budget) => {
                let engine = Arc::clone(&self.engine);
                let (tx, rx) = mpsc::channel();
                std::thread::spawn(move || {
                    let _ = tx.send(engine.recognize(&frame));
                });
                rx.recv_timeout(budget)
                    .map_err(|_| PlumblineError::OcrTimeout { page, budget })?
            }
        }
    }
}

impl<S: SheetSource> LabelExtractor<S> for OcrExtractor {
    fn extract(
        &self,
        source: &S,
        page: usize,
        keywords: &KeywordSet,
    ) -> Result<Vec<LabeledPoint>, PlumblineError> {
        let frame = source.rasterize(page, self.dpi)?;
        let tokens = self.recognize(page, frame)?;

        // Raster pixels back to page points
        let scale = PDF_POINTS_PER_INCH / self.dpi;

        Ok(tokens
            .into_iter()
            .filter(|token| token.confidence >= self.min_confidence)
            .filter_map(|token| {
                let label = token.text.to_uppercase();
                keywords
                    .matches(&label)
                    .then(|| LabeledPoint::new(page, label, token.bbox.scaled(scale)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlumblineError;
    use crate::extract::source::Word;
    use glam::Vec2;

    struct StubSource {
        frames: usize,
    }

    impl SheetSource for StubSource {
        fn page_count(&self) -> usize {
            self.frames
        }

        fn words(&self, _page: usize) -> Result<Vec<Word>, PlumblineError> {
            Ok(Vec::new())
        }

        fn rasterize(&self, _page: usize, _dpi: f32) -> Result<RgbImage, PlumblineError> {
            Ok(RgbImage::new(4, 4))
        }
    }

    struct StubEngine {
        tokens: Vec<OcrToken>,
    }

    impl OcrEngine for StubEngine {
        fn recognize(&self, _frame: &RgbImage) -> Result<Vec<OcrToken>, PlumblineError> {
            Ok(self.tokens.clone())
        }
    }

    fn token(text: &str, confidence: f32, min: (f32, f32), size: (f32, f32)) -> OcrToken {
        OcrToken {
            text: text.to_string(),
            bbox: Bbox::new_from_min_size(Vec2::new(min.0, min.1), Vec2::new(size.0, size.1)),
            confidence,
        }
    }

    #[test]
    fn test_confidence_filter_and_pixel_conversion() {
        // Token at confidence 35 is dropped even though its text matches;
        // the 41-confidence token survives and its pixel box
        // (100,100,50,20) at 200 DPI converts with factor 72/200 = 0.36 to
        // center (45.0, 39.6).
        let engine = StubEngine {
            tokens: vec![
                token("COL-9", 35.0, (400.0, 400.0), (40.0, 20.0)),
                token("COL-4", 41.0, (100.0, 100.0), (50.0, 20.0)),
            ],
        };
        let extractor = OcrExtractor::new(Arc::new(engine)).with_dpi(200.0);
        let source = StubSource { frames: 1 };

        let points = extractor
            .extract(&source, 0, &KeywordSet::default())
            .unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "COL-4");
        assert!((points[0].center.x - 45.0).abs() < 1e-4);
        assert!((points[0].center.y - 39.6).abs() < 1e-4);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let engine = StubEngine {
            tokens: vec![token("F30", 40.0, (0.0, 0.0), (10.0, 10.0))],
        };
        let extractor = OcrExtractor::new(Arc::new(engine));
        let source = StubSource { frames: 1 };

        let points = extractor
            .extract(&source, 0, &KeywordSet::default())
            .unwrap();

        // "below the threshold" is discarded; exactly at it is kept
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_non_matching_tokens_dropped() {
        let engine = StubEngine {
            tokens: vec![
                token("SCALE", 95.0, (0.0, 0.0), (10.0, 10.0)),
                token("post-2", 80.0, (50.0, 0.0), (10.0, 10.0)),
            ],
        };
        let extractor = OcrExtractor::new(Arc::new(engine));
        let source = StubSource { frames: 1 };

        let points = extractor
            .extract(&source, 0, &KeywordSet::default())
            .unwrap();

        // OCR labels are stored upper-cased, matching the keyword casing
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "POST-2");
    }

    #[test]
    fn test_page_budget_timeout() {
        struct SlowEngine;
        impl OcrEngine for SlowEngine {
            fn recognize(&self, _frame: &RgbImage) -> Result<Vec<OcrToken>, PlumblineError> {
                std::thread::sleep(Duration::from_millis(200));
                Ok(Vec::new())
            }
        }

        let extractor = OcrExtractor::new(Arc::new(SlowEngine))
            .with_page_budget(Some(Duration::from_millis(20)));
        let source = StubSource { frames: 1 };

        let result = extractor.extract(&source, 5, &KeywordSet::default());
        assert!(matches!(
            result,
            Err(PlumblineError::OcrTimeout { page: 5, .. })
        ));
    }
}
