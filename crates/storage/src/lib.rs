//! Boundary traits for Marquee's backing stores.
//!
//! The engine never talks to a CMS directly. It sees three collaborators:
//! a `PromptCatalog` of authored prompts, a key-value `SettingsStore`, and
//! a `WidgetIndexStore` persisting which widgets embed prompts by
//! shortcode. In-memory reference implementations back the tests and the
//! CLI fixtures.

mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::{MemoryCatalog, MemorySettings, MemoryWidgetIndex};
pub use record::Setting;
pub use traits::{PromptCatalog, SettingsStore, WidgetIndexStore};
