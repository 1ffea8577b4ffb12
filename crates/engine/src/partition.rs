//! Splitting the candidate set into inline placements and overlays.

use marquee_core::{Frequency, Prompt};

/// An inline prompt scheduled for insertion during one content pass.
#[derive(Debug, Clone)]
pub struct InlinePlacement {
    pub prompt: Prompt,
    /// Target byte offset into the rendered content:
    /// `rendered_length * trigger_scroll_progress / 100`.
    pub precise_position: f64,
    /// Transitions false -> true exactly once, when the marker is emitted.
    pub is_inserted: bool,
}

/// Partition eligible prompts into inline placements and overlay prompts.
///
/// Above-header prompts are excluded: they render through a separate path
/// outside body content. Manual prompts are excluded as a guard even
/// though selection already drops them. A prompt lands in at most one
/// bucket.
pub fn partition(prompts: Vec<Prompt>, rendered_length: usize) -> (Vec<InlinePlacement>, Vec<Prompt>) {
    let mut inline = Vec::new();
    let mut overlays = Vec::new();
    for prompt in prompts {
        if prompt.options.frequency == Frequency::Manual {
            continue;
        }
        if prompt.placement.is_inline() {
            let progress = f64::from(prompt.options.trigger_scroll_progress);
            inline.push(InlinePlacement {
                precise_position: rendered_length as f64 * progress / 100.0,
                is_inserted: false,
                prompt,
            });
        } else if prompt.placement.is_overlay() {
            overlays.push(prompt);
        }
    }
    (inline, overlays)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
