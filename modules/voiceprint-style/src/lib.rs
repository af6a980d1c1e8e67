pub mod analyzer;
pub mod error;
pub mod examples;
pub mod guidance;
pub mod themes;

pub use analyzer::{analyze, analyze_at};
pub use error::AnalysisError;
pub use examples::{select_examples, DEFAULT_EXAMPLE_COUNT};
pub use guidance::{
    generation_prompt, render_blend, render_multi, render_single, BlendTargets,
    MAX_GUIDANCE_EXAMPLES,
};
pub use themes::detect_themes;
