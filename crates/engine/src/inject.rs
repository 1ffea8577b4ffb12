//! Content injection: placing prompt markers into rendered content.
//!
//! All failure paths are policy early-returns: anything that goes wrong
//! yields the original content unchanged, never an error the host has to
//! handle mid-render.

use marquee_core::{Prompt, PromptId, ViewingContext};
use marquee_storage::PromptCatalog;

use crate::blocks::BlockEngine;
use crate::eligibility::should_display;
use crate::partition::partition;
use crate::select::prompts_for_view;
use crate::shortcode::{extract_ids, SHORTCODE_TAG};

/// Per-request injection state. Created at request start, dropped at
/// request end; the host passes it through the render call chain instead
/// of keeping a global flag.
#[derive(Debug, Default)]
pub struct RenderSession {
    content_has_rendered: bool,
}

impl RenderSession {
    pub fn new() -> RenderSession {
        RenderSession::default()
    }

    /// Whether the automatic injection pass has already run this request.
    pub fn has_rendered(&self) -> bool {
        self.content_has_rendered
    }
}

/// Marker emitted for an inline prompt, as an embeddable shortcode block.
fn inline_marker(id: PromptId) -> String {
    format!(
        "<!-- wp:shortcode -->[{} id=\"{}\"]<!-- /wp:shortcode -->",
        SHORTCODE_TAG, id
    )
}

/// Overlay markup is prepended as a raw-HTML block.
fn overlay_block(markup: &str) -> String {
    format!("<!-- wp:html -->{}<!-- /wp:html -->", markup)
}

/// Inject eligible prompts into body content. At most one automatic pass
/// runs per request; every skip condition returns the content unchanged.
pub fn insert_prompts_in_content(
    session: &mut RenderSession,
    catalog: &dyn PromptCatalog,
    blocks: &dyn BlockEngine,
    ctx: &ViewingContext,
    content: &str,
) -> String {
    if session.content_has_rendered {
        return content.to_string();
    }
    if ctx.is_admin_screen {
        return content.to_string();
    }
    if content.trim().is_empty() {
        return content.to_string();
    }
    if !ctx.is_singular {
        return content.to_string();
    }
    if !ctx.in_the_loop {
        return content.to_string();
    }
    // Never inject into a prompt's own body.
    if ctx.post_is_prompt {
        return content.to_string();
    }
    if ctx.content_restricted {
        return content.to_string();
    }

    let Ok(selected) = prompts_for_view(catalog, ctx) else {
        return content.to_string();
    };

    // Prompts already embedded by hand are not auto-placed again, and
    // above-header prompts never belong in body content.
    let shortcoded = extract_ids(content);
    let candidates: Vec<Prompt> = selected
        .into_iter()
        .filter(|p| !shortcoded.contains(&p.id) && p.placement.in_page_content())
        .collect();
    if candidates.is_empty() {
        return content.to_string();
    }

    let (mut inline, overlays) = partition(candidates, content.len());
    if inline.is_empty() && overlays.is_empty() {
        return content.to_string();
    }

    // Single pass over the blocks. A marker lands at the boundary
    // immediately after the first block whose cumulative rendered length
    // strictly exceeds the target offset.
    let mut pos = 0usize;
    let mut output = String::with_capacity(content.len());
    for block in blocks.parse_blocks(content) {
        let rendered = blocks.render_block(&block);
        pos += rendered.len();
        output.push_str(&rendered);
        for placement in inline.iter_mut() {
            if !placement.is_inserted && pos as f64 > placement.precise_position {
                output.push_str(&inline_marker(placement.prompt.id));
                placement.is_inserted = true;
            }
        }
    }

    // Targets beyond the content land at the very end, in list order.
    for placement in inline.iter_mut() {
        if !placement.is_inserted {
            output.push_str(&inline_marker(placement.prompt.id));
            placement.is_inserted = true;
        }
    }

    // Each prepend pushes earlier overlays toward the content, so the
    // last-listed overlay ends up first in the document.
    for overlay in &overlays {
        output.insert_str(0, &overlay_block(&overlay.markup));
    }

    session.content_has_rendered = true;
    output
}

/// Archive-page rendering: posts and pages get prompts through the content
/// pass, so this emits markup only on non-singular views.
pub fn prompts_after_header(catalog: &dyn PromptCatalog, ctx: &ViewingContext) -> String {
    if ctx.is_singular {
        return String::new();
    }
    match prompts_for_view(catalog, ctx) {
        Ok(prompts) => prompts
            .iter()
            .filter(|p| p.placement.in_page_content())
            .map(|p| p.markup.as_str())
            .collect(),
        Err(_) => String::new(),
    }
}

/// Above-header prompts, rendered before the page header on every view.
pub fn prompts_before_header(catalog: &dyn PromptCatalog, ctx: &ViewingContext) -> String {
    match prompts_for_view(catalog, ctx) {
        Ok(prompts) => prompts
            .iter()
            .filter(|p| p.placement.is_above_header())
            .map(|p| p.markup.as_str())
            .collect(),
        Err(_) => String::new(),
    }
}

/// The manual embedding escape hatch: render one prompt where its
/// shortcode appears.
///
/// A previewed prompt takes priority over the id attribute and bypasses
/// the display filters. Otherwise the prompt must pass the operator gates
/// (context checks skipped -- the author placed it deliberately) and must
/// be inline; overlays cannot be embedded. Anything missing or ineligible
/// renders as the empty string.
pub fn render_shortcode(
    catalog: &dyn PromptCatalog,
    ctx: &ViewingContext,
    id: Option<PromptId>,
) -> String {
    let found = if let Some(preview_id) = ctx.previewed_prompt_id {
        catalog.retrieve_preview_prompt(preview_id).ok().flatten()
    } else if let Some(id) = id {
        catalog
            .retrieve_prompt_by_id(id, ctx.viewing_as())
            .ok()
            .flatten()
    } else {
        None
    };
    let Some(prompt) = found else {
        return String::new();
    };

    let is_preview = ctx.previewed_prompt_id.is_some();
    if !is_preview && !should_display(&prompt, ctx, true) {
        return String::new();
    }
    if !prompt.placement.is_inline() {
        return String::new();
    }

    // The aside wrapper keeps the markup intact when the shortcode is the
    // first block of content.
    format!("<aside>{}</aside>", prompt.markup)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
