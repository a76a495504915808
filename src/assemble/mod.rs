//! Highlight window computation and output assembly.

mod assembler;
mod window;

pub use assembler::{AssembleSettings, SegmentAssembler};
pub use window::HighlightWindow;
