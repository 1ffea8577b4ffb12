//! Widget shortcode index tracking.
//!
//! Widgets live outside post content, so the injector never sees them;
//! their shortcode references are recorded at save time and read back by
//! the payload builder. Only free-text widgets can carry shortcodes.

use std::collections::BTreeSet;

use marquee_core::PromptId;
use marquee_storage::{StorageError, WidgetIndexStore};

use crate::shortcode::extract_ids;

/// Widget kind whose body text can embed prompt shortcodes.
pub const TEXT_WIDGET_KIND: &str = "text";

/// Widget-save hook: record the prompt ids shortcoded in a text widget's
/// body. Other widget kinds are ignored. Saving a text widget with no
/// shortcodes records an empty list, clearing any stale entry.
pub fn save_widget(
    store: &dyn WidgetIndexStore,
    widget_id: &str,
    kind: &str,
    text: &str,
) -> Result<(), StorageError> {
    if kind != TEXT_WIDGET_KIND {
        return Ok(());
    }
    let mut index = store.get_index()?;
    index.insert(widget_id.to_string(), extract_ids(text).into_iter().collect());
    store.set_index(index)
}

/// Widget-delete hook: drop the widget's entry. Removing an unknown
/// widget is a no-op.
pub fn remove_widget(store: &dyn WidgetIndexStore, widget_id: &str) -> Result<(), StorageError> {
    let mut index = store.get_index()?;
    index.remove(widget_id);
    store.set_index(index)
}

/// Union of all prompt ids recorded across widgets.
pub fn all_widget_prompt_ids(
    store: &dyn WidgetIndexStore,
) -> Result<BTreeSet<PromptId>, StorageError> {
    Ok(store
        .get_index()?
        .into_values()
        .flatten()
        .collect())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
