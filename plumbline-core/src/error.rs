use std::time::Duration;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlumblineError {
    #[snafu(display("Pdfium `{}` error: {}", stage, source))]
    Pdfium {
        source: pdfium_render::prelude::PdfiumError,
        stage: String,
    },
    #[snafu(display("Encode raster at `{}` error: {}", stage, source))]
    ImageEncode {
        source: image::ImageError,
        stage: String,
    },
    #[snafu(display("OCR engine `{}` error: {}", stage, message))]
    Ocr { stage: String, message: String },
    #[snafu(display("OCR exceeded {:?} budget on page {}", budget, page))]
    OcrTimeout { page: usize, budget: Duration },
    #[snafu(display("Page {} out of range, document has {} pages", page, page_count))]
    PageOutOfRange { page: usize, page_count: usize },
    #[snafu(display("Page {} is not present in the dataset", page))]
    PageNotFound { page: usize },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Environment `{}` Not Found, error {}", name, source))]
    EnvNotFound {
        source: std::env::VarError,
        name: String,
    },
}
