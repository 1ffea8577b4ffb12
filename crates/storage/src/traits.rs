use std::collections::BTreeMap;

use marquee_core::{Prompt, PromptId};

use crate::error::StorageError;
use crate::record::Setting;

/// Read access to the authored prompt catalog.
///
/// Retrieval is placement-scoped: the selection pipeline asks for inline,
/// generic-overlay, and category-overlay prompts separately, because
/// category overlays take priority over generic ones.
///
/// `include_unpublished` widens visibility to unpublished prompts (the
/// view-as / preview flows). `segment` is an operator override: when set,
/// implementations return prompts that are unsegmented or target that
/// segment.
///
/// Returned lists preserve the catalog's authoring order; the injector's
/// stacking semantics depend on it.
pub trait PromptCatalog: Send + Sync {
    fn retrieve_inline_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError>;

    fn retrieve_overlay_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError>;

    fn retrieve_category_overlay_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError>;

    fn retrieve_above_header_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError>;

    /// Look up a prompt by id. A missing id is `Ok(None)`, not an error:
    /// callers treat it as "no prompt shown".
    fn retrieve_prompt_by_id(
        &self,
        id: PromptId,
        include_unpublished: bool,
    ) -> Result<Option<Prompt>, StorageError>;

    /// Look up the transient preview variant of a prompt, if one has been
    /// materialized by the authoring UI.
    fn retrieve_preview_prompt(&self, id: PromptId) -> Result<Option<Prompt>, StorageError>;
}

/// The host's key-value settings store.
pub trait SettingsStore: Send + Sync {
    fn get_settings(&self) -> Result<Vec<Setting>, StorageError>;
}

/// Persistence for the widget shortcode index: which prompt ids each
/// widget references via manual shortcode. Read at request time by the
/// payload builder; written only on widget save/delete events.
pub trait WidgetIndexStore: Send + Sync {
    fn get_index(&self) -> Result<BTreeMap<String, Vec<PromptId>>, StorageError>;

    fn set_index(&self, index: BTreeMap<String, Vec<PromptId>>) -> Result<(), StorageError>;
}
