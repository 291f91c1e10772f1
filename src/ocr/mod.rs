mod engine;
mod tesseract;

pub use engine::{OcrEngine, Recognition};
pub use tesseract::TesseractEngine;

#[cfg(test)]
pub use engine::MockOcrEngine;
