//! Prompt selection: from catalog to the candidate set for one view.

use marquee_core::{Frequency, Prompt, ViewingContext};
use marquee_storage::{PromptCatalog, StorageError};

use crate::eligibility::should_display;

/// Post types that participate in prompt campaigns.
pub const CAMPAIGN_POST_TYPES: &[&str] = &["post", "page"];

/// Retrieve and filter the prompts eligible for the current view.
///
/// Selection order:
/// 1. Non-campaign post types and opted-out pages get nothing.
/// 2. A previewed prompt short-circuits everything else.
/// 3. Inline and above-header prompts, plus overlays -- category-targeted
///    overlays take priority: if any are eligible, generic overlays are
///    dropped entirely rather than merged.
/// 4. Manual-frequency prompts are excluded from automatic selection.
///
/// The result covers every render path (body injection, before-header,
/// access payload); each caller filters by placement.
pub fn prompts_for_view(
    catalog: &dyn PromptCatalog,
    ctx: &ViewingContext,
) -> Result<Vec<Prompt>, StorageError> {
    if !CAMPAIGN_POST_TYPES.contains(&ctx.post_type.as_str()) {
        return Ok(Vec::new());
    }

    if let Some(preview_id) = ctx.previewed_prompt_id {
        return Ok(catalog
            .retrieve_preview_prompt(preview_id)?
            .into_iter()
            .collect());
    }

    if ctx.prompts_disabled {
        return Ok(Vec::new());
    }

    let (show_unpublished, segment) = match &ctx.view_as {
        Some(spec) => (spec.show_unpublished, spec.segment.as_deref()),
        None => (false, None),
    };

    let mut selected: Vec<Prompt> = catalog
        .retrieve_inline_prompts(show_unpublished, segment)?
        .into_iter()
        .chain(catalog.retrieve_above_header_prompts(show_unpublished, segment)?)
        .filter(|p| is_candidate(p, ctx))
        .collect();

    let category_overlays: Vec<Prompt> = catalog
        .retrieve_category_overlay_prompts(show_unpublished, segment)?
        .into_iter()
        .filter(|p| is_candidate(p, ctx))
        .collect();

    let overlays = if category_overlays.is_empty() {
        catalog
            .retrieve_overlay_prompts(show_unpublished, segment)?
            .into_iter()
            .filter(|p| is_candidate(p, ctx))
            .collect()
    } else {
        category_overlays
    };

    selected.extend(overlays);
    Ok(selected)
}

fn is_candidate(prompt: &Prompt, ctx: &ViewingContext) -> bool {
    prompt.options.frequency != Frequency::Manual && should_display(prompt, ctx, false)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
