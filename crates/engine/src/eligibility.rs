//! The eligibility filter: pure predicates over (prompt, context).
//!
//! Order matters and mirrors the product rules: manual prompts are always
//! displayable (they only render where explicitly embedded), a view-as
//! override bypasses the operator gates, operators never see prompts in
//! normal mode, and non-interactive mode suppresses overlays only.

use marquee_core::{Frequency, Prompt, ViewingContext};

/// Should this prompt be rendered for this view?
///
/// `skip_context_checks` is used for manually-shortcoded prompts: the
/// author placed the prompt by hand, so page-type and taxonomy matching
/// are skipped once the operator gates pass.
pub fn should_display(prompt: &Prompt, ctx: &ViewingContext, skip_context_checks: bool) -> bool {
    if prompt.options.frequency == Frequency::Manual {
        return true;
    }

    let general =
        is_post_compatible(prompt, ctx) && categories_match(prompt, ctx) && tags_match(prompt, ctx);

    // View-as is the testing escape hatch: targeting rules apply, operator
    // gates do not.
    if ctx.viewing_as() {
        return general;
    }
    if ctx.is_admin_user {
        return false;
    }
    if ctx.non_interactive && !prompt.placement.is_inline() {
        return false;
    }
    if skip_context_checks {
        return true;
    }
    general
}

/// Inline prompts can only appear on single posts; other placements are
/// page-type agnostic.
fn is_post_compatible(prompt: &Prompt, ctx: &ViewingContext) -> bool {
    if prompt.placement.is_inline() {
        return ctx.is_single;
    }
    true
}

/// Category targeting. The catch-all "uncategorized" term is stripped from
/// the prompt side first: it is applied automatically on publish and
/// carries no targeting intent. If either side then has no terms, there is
/// no constraint and the prompt is eligible.
fn categories_match(prompt: &Prompt, ctx: &ViewingContext) -> bool {
    let prompt_categories: Vec<_> = prompt
        .options
        .categories
        .iter()
        .filter(|term| Some(**term) != ctx.uncategorized_term)
        .collect();

    if ctx.categories.is_empty() || prompt_categories.is_empty() {
        return true;
    }
    prompt_categories
        .iter()
        .any(|term| ctx.categories.contains(term))
}

/// Tag targeting; permissive on either empty side, like categories but
/// with no catch-all term to strip.
fn tags_match(prompt: &Prompt, ctx: &ViewingContext) -> bool {
    if ctx.tags.is_empty() || prompt.options.tags.is_empty() {
        return true;
    }
    prompt
        .options
        .tags
        .iter()
        .any(|term| ctx.tags.contains(term))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
