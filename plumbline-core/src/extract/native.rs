use crate::{
    error::PlumblineError,
    extract::{KeywordSet, LabelExtractor, LabeledPoint, source::SheetSource},
};

/// Vector text-layer extraction strategy.
///
/// Word tokens arrive with exact bounds, so there is no confidence filter.
/// Labels keep their original casing; matching upper-cases internally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeExtractor;

impl<S: SheetSource> LabelExtractor<S> for NativeExtractor {
    fn extract(
        &self,
        source: &S,
        page: usize,
        keywords: &KeywordSet,
    ) -> Result<Vec<LabeledPoint>, PlumblineError> {
        let words = source.words(page)?;

        Ok(words
            .into_iter()
            .filter(|word| keywords.matches(&word.text))
            .map(|word| LabeledPoint::new(page, word.text, word.bbox))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::source::Word;
    use crate::geometry::bbox::Bbox;
    use glam::Vec2;
    use image::RgbImage;

    struct StubSource {
        words: Vec<Word>,
    }

    impl SheetSource for StubSource {
        fn page_count(&self) -> usize {
            1
        }

        fn words(&self, _page: usize) -> Result<Vec<Word>, PlumblineError> {
            Ok(self.words.clone())
        }

        fn rasterize(&self, _page: usize, _dpi: f32) -> Result<RgbImage, PlumblineError> {
            Ok(RgbImage::new(1, 1))
        }
    }

    fn word(text: &str, min: (f32, f32), max: (f32, f32)) -> Word {
        Word {
            text: text.to_string(),
            bbox: Bbox::new(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1)),
        }
    }

    #[test]
    fn test_native_extraction_filters_by_keyword() {
        let source = StubSource {
            words: vec![
                word("COL-4", (100.0, 200.0), (140.0, 212.0)),
                word("SCALE", (10.0, 10.0), (40.0, 22.0)),
                word("f30", (300.0, 400.0), (330.0, 412.0)),
            ],
        };

        let points = NativeExtractor
            .extract(&source, 7, &KeywordSet::default())
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "COL-4");
        assert_eq!(points[0].page, 7);
        // Center derived from the box once, at extraction
        assert_eq!(points[0].center, Vec2::new(120.0, 206.0));
        // Original casing preserved for native tokens
        assert_eq!(points[1].label, "f30");
    }

    #[test]
    fn test_native_extraction_empty_page() {
        let source = StubSource { words: Vec::new() };

        let points = NativeExtractor
            .extract(&source, 0, &KeywordSet::default())
            .unwrap();

        assert!(points.is_empty());
    }
}
