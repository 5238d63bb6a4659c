//! Prompt building and response parsing for the generate/reflect workflow

pub mod extract;
pub mod prompt;
pub mod reflect;

pub use extract::{extract_diff, Extraction, DIFF_MARKER};
pub use prompt::{
    build_generate_prompt, build_reflect_prompt, format_repo_context, GENERATE_PREAMBLE,
    REFLECT_PREAMBLE,
};
pub use reflect::{parse_reflection, Reflection};
