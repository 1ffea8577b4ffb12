//! The per-request viewing context.
//!
//! Constructed once by the host's request layer and treated as immutable
//! by the engine. Everything the eligibility filter and injector need to
//! know about the current page view lives here, so the pipeline stays a
//! set of pure functions over (prompt, context).

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

use crate::prompt::{PromptId, TermId};

/// A "view as" override, used by operators to preview targeting without
/// logging out. Parsed from a `;`-separated `key:value` spec string, e.g.
/// `segment:donors;show_unpublished:true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewAsSpec {
    /// The spec string exactly as received; appended verbatim to the
    /// access payload.
    pub raw: String,
    /// Segment to view the page as.
    pub segment: Option<String>,
    /// Also show unpublished prompts.
    pub show_unpublished: bool,
}

impl ViewAsSpec {
    /// Parse a spec string. Unknown keys are ignored; an empty (or
    /// all-whitespace) spec means no override is active.
    pub fn parse(spec: &str) -> Option<ViewAsSpec> {
        if spec.trim().is_empty() {
            return None;
        }
        let mut segment = None;
        let mut show_unpublished = false;
        for pair in spec.split(';') {
            let mut parts = pair.splitn(2, ':');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();
            match key {
                "segment" if !value.is_empty() => segment = Some(value.to_string()),
                "show_unpublished" => show_unpublished = value == "true",
                _ => {}
            }
        }
        Some(ViewAsSpec {
            raw: spec.to_string(),
            segment,
            show_unpublished,
        })
    }
}

impl fmt::Display for ViewAsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl<'de> Deserialize<'de> for ViewAsSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let spec = String::deserialize(deserializer)?;
        ViewAsSpec::parse(&spec).ok_or_else(|| D::Error::custom("empty view-as spec"))
    }
}

/// Everything known about the current page view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewingContext {
    pub post_id: u64,
    /// Host post type token (`post`, `page`, ...). Prompts are injected
    /// only into campaign-eligible types.
    pub post_type: String,
    pub categories: BTreeSet<TermId>,
    pub tags: BTreeSet<TermId>,
    /// The catch-all category term automatically applied to uncategorized
    /// posts; excluded from the prompt side of the category filter.
    pub uncategorized_term: Option<TermId>,
    /// A single-entity view (post, page, or other singular type).
    pub is_singular: bool,
    /// Specifically a single post (inline prompts require this).
    pub is_single: bool,
    /// The render is happening inside the primary content loop.
    pub in_the_loop: bool,
    /// Administrative/editing screen, not a reader-facing render.
    pub is_admin_screen: bool,
    /// The viewer is a logged-in operator.
    pub is_admin_user: bool,
    /// The entity being rendered is itself a prompt.
    pub post_is_prompt: bool,
    /// A paywall collaborator reports the content as restricted.
    pub content_restricted: bool,
    /// Per-page opt-out of all prompts.
    pub prompts_disabled: bool,
    /// Non-interactive mode: overlays are suppressed, inline prompts stay.
    pub non_interactive: bool,
    pub view_as: Option<ViewAsSpec>,
    /// A prompt being previewed from the authoring UI; short-circuits
    /// selection and bypasses most filters.
    pub previewed_prompt_id: Option<PromptId>,
}

impl Default for ViewingContext {
    fn default() -> Self {
        ViewingContext {
            post_id: 0,
            post_type: "post".to_string(),
            categories: BTreeSet::new(),
            tags: BTreeSet::new(),
            uncategorized_term: None,
            is_singular: true,
            is_single: true,
            in_the_loop: true,
            is_admin_screen: false,
            is_admin_user: false,
            post_is_prompt: false,
            content_restricted: false,
            prompts_disabled: false,
            non_interactive: false,
            view_as: None,
            previewed_prompt_id: None,
        }
    }
}

impl ViewingContext {
    /// A reader viewing a single post, the common case in tests.
    pub fn single_post(post_id: u64) -> ViewingContext {
        ViewingContext {
            post_id,
            ..ViewingContext::default()
        }
    }

    /// Whether a view-as override is active.
    pub fn viewing_as(&self) -> bool {
        self.view_as.is_some()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
