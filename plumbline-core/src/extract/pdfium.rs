use std::path::{Path, PathBuf};

use glam::Vec2;
use image::RgbImage;
use pdfium_render::prelude::*;
use snafu::ResultExt;

use crate::{
    consts::{PDF_POINTS_PER_INCH, PDFIUM_LIB_PATH_ENV_NAME},
    error::{EnvNotFoundSnafu, PdfiumSnafu, PlumblineError},
    extract::source::{SheetSource, Word},
    geometry::bbox::Bbox,
};

/// `SheetSource` backed by a pdfium-rendered PDF document.
///
/// The document is reloaded per operation rather than held open: pdfium's
/// page handles borrow the document, and keeping one alive across calls
/// would tie every extraction to a single lifetime. Load cost is negligible
/// next to rendering and OCR.
pub struct PdfiumSheetSource {
    pdfium: Pdfium,
    path: PathBuf,
    password: Option<String>,
    page_count: usize,
}

impl PdfiumSheetSource {
    /// Binds pdfium from `PDFIUM_DYNAMIC_LIB_PATH` and opens the document
    /// once to validate it and record the page count.
    pub fn open(path: &Path, password: Option<&str>) -> Result<Self, PlumblineError> {
        let pdfium_lib_path =
            std::env::var(PDFIUM_LIB_PATH_ENV_NAME).context(EnvNotFoundSnafu {
                name: PDFIUM_LIB_PATH_ENV_NAME,
            })?;

        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                &pdfium_lib_path,
            ))
            .context(PdfiumSnafu {
                stage: "load-dyn-lib",
            })?,
        );

        let page_count = {
            let document = pdfium
                .load_pdf_from_file(path, password)
                .context(PdfiumSnafu {
                    stage: "load-pdf-by-path",
                })?;
            document.pages().len() as usize
        };

        Ok(Self {
            pdfium,
            path: path.to_path_buf(),
            password: password.map(str::to_string),
            page_count,
        })
    }

    fn document(&self) -> Result<PdfDocument<'_>, PlumblineError> {
        self.pdfium
            .load_pdf_from_file(&self.path, self.password.as_deref())
            .context(PdfiumSnafu {
                stage: "load-pdf-by-path",
            })
    }

    fn check_page(&self, page: usize) -> Result<(), PlumblineError> {
        if page >= self.page_count {
            return Err(PlumblineError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }
        Ok(())
    }

    /// Leading text of a page, for sheet selection listings. Scanned pages
    /// with no text layer produce an empty preview.
    pub fn page_preview(&self, page: usize, max_chars: usize) -> Result<String, PlumblineError> {
        self.check_page(page)?;

        let document = self.document()?;
        let pdf_page = document
            .pages()
            .get(page as u16)
            .context(PdfiumSnafu { stage: "get-page" })?;
        let text = pdf_page.text().context(PdfiumSnafu { stage: "text" })?;

        Ok(text
            .all()
            .chars()
            .take(max_chars)
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect())
    }
}

impl SheetSource for PdfiumSheetSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    /// Groups pdfium's per-character boxes into whitespace-delimited words.
    ///
    /// Pdfium reports character bounds with a bottom-left origin; boxes are
    /// flipped to the top-left convention so native and OCR tokens share one
    /// coordinate frame.
    fn words(&self, page: usize) -> Result<Vec<Word>, PlumblineError> {
        self.check_page(page)?;

        let document = self.document()?;
        let pdf_page = document
            .pages()
            .get(page as u16)
            .context(PdfiumSnafu { stage: "get-page" })?;
        let page_height = pdf_page.height().value;
        let text = pdf_page.text().context(PdfiumSnafu { stage: "text" })?;

        let mut words = Vec::new();
        let mut current = String::new();
        let mut bounds: Option<Bbox> = None;

        for char in text.chars().iter() {
            let unicode = char.unicode_char().unwrap_or(' ');
            if unicode.is_whitespace() {
                flush_word(&mut words, &mut current, &mut bounds);
                continue;
            }

            let rect = char
                .loose_bounds()
                .context(PdfiumSnafu { stage: "char-bounds" })?;
            let char_bbox = Bbox::new(
                Vec2::new(rect.left.value, rect.bottom.value),
                Vec2::new(rect.right.value, rect.top.value),
            )
            .flip_y(page_height);

            current.push(unicode);
            bounds = Some(match bounds {
                Some(acc) => acc.union(&char_bbox),
                None => char_bbox,
            });
        }
        flush_word(&mut words, &mut current, &mut bounds);

        Ok(words)
    }

    fn rasterize(&self, page: usize, dpi: f32) -> Result<RgbImage, PlumblineError> {
        self.check_page(page)?;

        let document = self.document()?;
        let pdf_page = document
            .pages()
            .get(page as u16)
            .context(PdfiumSnafu { stage: "get-page" })?;

        let scale = dpi / PDF_POINTS_PER_INCH;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let image = pdf_page
            .render_with_config(&render_config)
            .context(PdfiumSnafu { stage: "render" })?
            .as_image()
            .into_rgb8();

        Ok(image)
    }
}

fn flush_word(words: &mut Vec<Word>, current: &mut String, bounds: &mut Option<Bbox>) {
    if let Some(bbox) = bounds.take() {
        if !current.is_empty() {
            words.push(Word {
                text: std::mem::take(current),
                bbox,
            });
        }
    }
    current.clear();
}
