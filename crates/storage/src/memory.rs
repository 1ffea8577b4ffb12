//! In-memory reference implementations.
//!
//! These back the engine tests and the CLI fixtures; a production host
//! would implement the traits over its own catalog and options tables.

use std::collections::BTreeMap;
use std::sync::Mutex;

use marquee_core::{Placement, Prompt, PromptId};

use crate::error::StorageError;
use crate::record::Setting;
use crate::traits::{PromptCatalog, SettingsStore, WidgetIndexStore};

/// A fixed catalog of validated prompts, plus any materialized previews.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    prompts: Vec<Prompt>,
    previews: BTreeMap<PromptId, Prompt>,
}

impl MemoryCatalog {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        MemoryCatalog {
            prompts,
            previews: BTreeMap::new(),
        }
    }

    /// Validate raw JSON records into a catalog. The first malformed
    /// record aborts construction.
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self, StorageError> {
        let prompts = records
            .iter()
            .map(Prompt::from_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::InvalidRecord {
                message: e.to_string(),
            })?;
        Ok(MemoryCatalog::new(prompts))
    }

    /// Materialize a preview variant, keyed by the prompt id.
    pub fn with_preview(mut self, prompt: Prompt) -> Self {
        self.previews.insert(prompt.id, prompt);
        self
    }

    fn retrieve(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
        placement: Placement,
    ) -> Vec<Prompt> {
        self.prompts
            .iter()
            .filter(|p| p.placement == placement)
            .filter(|p| p.published || include_unpublished)
            .filter(|p| segment_matches(p, segment))
            .cloned()
            .collect()
    }
}

fn segment_matches(prompt: &Prompt, segment: Option<&str>) -> bool {
    match (segment, prompt.options.selected_segment_id.as_deref()) {
        (Some(wanted), Some(assigned)) => wanted == assigned,
        // Unsegmented prompts show to everyone; without an override the
        // client script handles segment gating.
        _ => true,
    }
}

impl PromptCatalog for MemoryCatalog {
    fn retrieve_inline_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError> {
        Ok(self.retrieve(include_unpublished, segment, Placement::Inline))
    }

    fn retrieve_overlay_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError> {
        Ok(self.retrieve(include_unpublished, segment, Placement::OverlayGeneric))
    }

    fn retrieve_category_overlay_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError> {
        Ok(self.retrieve(include_unpublished, segment, Placement::OverlayCategory))
    }

    fn retrieve_above_header_prompts(
        &self,
        include_unpublished: bool,
        segment: Option<&str>,
    ) -> Result<Vec<Prompt>, StorageError> {
        Ok(self.retrieve(include_unpublished, segment, Placement::AboveHeader))
    }

    fn retrieve_prompt_by_id(
        &self,
        id: PromptId,
        include_unpublished: bool,
    ) -> Result<Option<Prompt>, StorageError> {
        Ok(self
            .prompts
            .iter()
            .find(|p| p.id == id && (p.published || include_unpublished))
            .cloned())
    }

    fn retrieve_preview_prompt(&self, id: PromptId) -> Result<Option<Prompt>, StorageError> {
        Ok(self.previews.get(&id).cloned())
    }
}

/// A fixed list of settings.
#[derive(Debug, Default)]
pub struct MemorySettings {
    settings: Vec<Setting>,
}

impl MemorySettings {
    pub fn new(settings: Vec<Setting>) -> Self {
        MemorySettings { settings }
    }
}

impl SettingsStore for MemorySettings {
    fn get_settings(&self) -> Result<Vec<Setting>, StorageError> {
        Ok(self.settings.clone())
    }
}

/// Widget shortcode index held in a mutex; mutation happens only on
/// widget lifecycle events, never per request.
#[derive(Debug, Default)]
pub struct MemoryWidgetIndex {
    index: Mutex<BTreeMap<String, Vec<PromptId>>>,
}

impl WidgetIndexStore for MemoryWidgetIndex {
    fn get_index(&self) -> Result<BTreeMap<String, Vec<PromptId>>, StorageError> {
        self.index
            .lock()
            .map(|index| index.clone())
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    fn set_index(&self, index: BTreeMap<String, Vec<PromptId>>) -> Result<(), StorageError> {
        let mut guard = self
            .index
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        *guard = index;
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::from_records(&[
            json!({
                "id": 1,
                "placement": "inline",
                "options": { "frequency": "always" }
            }),
            json!({
                "id": 2,
                "placement": "overlay-generic",
                "published": false,
                "options": { "frequency": "once" }
            }),
            json!({
                "id": 3,
                "placement": "overlay-category",
                "options": { "frequency": "once", "categories": [5] }
            }),
            json!({
                "id": 4,
                "placement": "inline",
                "options": { "frequency": "always", "selected_segment_id": "donors" }
            }),
        ])
        .unwrap()
    }

    #[test]
    fn retrieval_is_placement_scoped() {
        let catalog = catalog();
        let inline = catalog.retrieve_inline_prompts(false, None).unwrap();
        assert_eq!(
            inline.iter().map(|p| p.id.0).collect::<Vec<_>>(),
            vec![1, 4]
        );
        let category = catalog
            .retrieve_category_overlay_prompts(false, None)
            .unwrap();
        assert_eq!(category.len(), 1);
        assert_eq!(category[0].id, PromptId(3));
    }

    #[test]
    fn unpublished_hidden_unless_requested() {
        let catalog = catalog();
        assert!(catalog.retrieve_overlay_prompts(false, None).unwrap().is_empty());
        let all = catalog.retrieve_overlay_prompts(true, None).unwrap();
        assert_eq!(all.len(), 1);

        assert!(catalog
            .retrieve_prompt_by_id(PromptId(2), false)
            .unwrap()
            .is_none());
        assert!(catalog
            .retrieve_prompt_by_id(PromptId(2), true)
            .unwrap()
            .is_some());
    }

    #[test]
    fn segment_override_keeps_unsegmented_prompts() {
        let catalog = catalog();
        let inline = catalog
            .retrieve_inline_prompts(false, Some("donors"))
            .unwrap();
        assert_eq!(inline.len(), 2);
        let inline = catalog
            .retrieve_inline_prompts(false, Some("students"))
            .unwrap();
        assert_eq!(inline.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn missing_id_is_none_not_error() {
        let catalog = catalog();
        assert!(catalog
            .retrieve_prompt_by_id(PromptId(99), true)
            .unwrap()
            .is_none());
    }

    #[test]
    fn preview_lookup() {
        let preview = Prompt::from_record(&json!({
            "id": 7,
            "placement": "inline",
            "published": false,
            "options": { "frequency": "always" }
        }))
        .unwrap();
        let catalog = MemoryCatalog::new(vec![]).with_preview(preview);
        assert!(catalog.retrieve_preview_prompt(PromptId(7)).unwrap().is_some());
        assert!(catalog.retrieve_preview_prompt(PromptId(8)).unwrap().is_none());
    }

    #[test]
    fn malformed_record_aborts_catalog() {
        let result = MemoryCatalog::from_records(&[json!({ "placement": "inline" })]);
        assert!(matches!(result, Err(StorageError::InvalidRecord { .. })));
    }

    #[test]
    fn widget_index_roundtrip() {
        let store = MemoryWidgetIndex::default();
        assert!(store.get_index().unwrap().is_empty());
        let mut index = BTreeMap::new();
        index.insert("sidebar-1".to_string(), vec![PromptId(4), PromptId(9)]);
        store.set_index(index.clone()).unwrap();
        assert_eq!(store.get_index().unwrap(), index);
    }
}
