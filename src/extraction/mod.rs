pub mod types;
pub mod numerals;
pub mod patterns;
pub mod render;
pub mod orchestrator;

pub use types::*;
pub use orchestrator::*;

/// Extract with a default extractor: system clock, no validity window,
/// canonical display.
pub fn start(input: &str) -> ExtractionResult {
    TimeExtractor::default().start(input)
}
