//! Marquee domain types.
//!
//! A "prompt" is a promotional unit (inline teaser, overlay, or
//! above-header banner) authored outside this system. These types are the
//! validated, read-only view the placement engine works with: raw catalog
//! records are checked once at the boundary (`Prompt::from_record`), never
//! deep in the pipeline.

pub mod context;
pub mod prompt;

pub use context::{ViewAsSpec, ViewingContext};
pub use prompt::{
    Frequency, Placement, Prompt, PromptId, PromptOptions, RecordError, TermId,
};
