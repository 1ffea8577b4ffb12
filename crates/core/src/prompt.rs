//! Prompt records and their validation.
//!
//! The catalog hands the engine loosely-structured JSON records. Everything
//! is validated here into a tagged `Placement` plus typed `PromptOptions`;
//! downstream code can rely on well-formed prompts and stays total.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Identifiers
// ──────────────────────────────────────────────

/// Numeric prompt identifier. The shortcode grammar (`id="42"`) and the
/// access payload both carry it in decimal form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PromptId(pub u64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Taxonomy term identifier (category or tag).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TermId(pub u64);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ──────────────────────────────────────────────
// Placement and frequency
// ──────────────────────────────────────────────

/// Where a prompt is injected into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Inserted into body content at a scroll-derived offset.
    Inline,
    /// Overlay shown regardless of the page's taxonomy terms.
    OverlayGeneric,
    /// Overlay targeted at specific categories. When any of these are
    /// eligible for a view, generic overlays are dropped entirely.
    OverlayCategory,
    /// Rendered above the page header, outside body content.
    AboveHeader,
}

impl Placement {
    pub fn is_inline(self) -> bool {
        matches!(self, Placement::Inline)
    }

    pub fn is_overlay(self) -> bool {
        matches!(self, Placement::OverlayGeneric | Placement::OverlayCategory)
    }

    pub fn is_above_header(self) -> bool {
        matches!(self, Placement::AboveHeader)
    }

    /// Whether the prompt belongs in body content (inline or overlay).
    /// Above-header prompts go through a separate render path.
    pub fn in_page_content(self) -> bool {
        !self.is_above_header()
    }

    fn from_token(token: &str) -> Option<Placement> {
        match token {
            "inline" => Some(Placement::Inline),
            "overlay-generic" => Some(Placement::OverlayGeneric),
            "overlay-category" => Some(Placement::OverlayCategory),
            "above-header" => Some(Placement::AboveHeader),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Inline => "inline",
            Placement::OverlayGeneric => "overlay-generic",
            Placement::OverlayCategory => "overlay-category",
            Placement::AboveHeader => "above-header",
        }
    }
}

/// How often a prompt may be shown to one reader.
///
/// `Manual` prompts are never auto-placed: they render only where an
/// explicit shortcode embeds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Always,
    Once,
    Daily,
    Manual,
}

impl Frequency {
    fn from_token(token: &str) -> Option<Frequency> {
        match token {
            "always" => Some(Frequency::Always),
            "once" => Some(Frequency::Once),
            "daily" => Some(Frequency::Daily),
            "manual" => Some(Frequency::Manual),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Always => "always",
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Manual => "manual",
        }
    }
}

// ──────────────────────────────────────────────
// Prompt
// ──────────────────────────────────────────────

/// Authoring options shared by all placement kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub frequency: Frequency,
    /// Percentage of content the reader must pass before an inline prompt
    /// appears. 0..=100.
    pub trigger_scroll_progress: u8,
    /// Suppress the prompt for visits arriving with a matching UTM source.
    pub utm_suppression: bool,
    /// Audience segment this prompt targets, if any.
    pub selected_segment_id: Option<String>,
    pub categories: BTreeSet<TermId>,
    pub tags: BTreeSet<TermId>,
    /// The prompt body contains a newsletter signup block.
    pub has_newsletter_prompt: bool,
    /// The prompt body contains a donation block.
    pub has_donation_block: bool,
}

/// A validated prompt record, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub id: PromptId,
    pub placement: Placement,
    /// Unpublished prompts are visible only when the catalog is queried
    /// with unpublished visibility (view-as / preview flows).
    pub published: bool,
    /// Pre-rendered prompt markup supplied by the authoring layer.
    pub markup: String,
    pub options: PromptOptions,
}

impl Prompt {
    /// Identifier-safe form used as the key in the client access script.
    pub fn canonical_id(&self) -> String {
        format!("id_{}", self.id)
    }

    /// Validate a raw catalog record.
    ///
    /// `id`, `placement`, and `options.frequency` are required; everything
    /// else defaults. Malformed records are a caller contract violation and
    /// are rejected here rather than tolerated downstream.
    pub fn from_record(record: &serde_json::Value) -> Result<Prompt, RecordError> {
        let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

        let id = obj
            .get("id")
            .and_then(|v| v.as_u64())
            .map(PromptId)
            .ok_or(RecordError::MissingField { field: "id" })?;

        let placement_token = obj
            .get("placement")
            .and_then(|v| v.as_str())
            .ok_or(RecordError::MissingField { field: "placement" })?;
        let placement =
            Placement::from_token(placement_token).ok_or_else(|| RecordError::InvalidField {
                field: "placement",
                message: format!("unknown placement '{}'", placement_token),
            })?;

        let published = obj.get("published").and_then(|v| v.as_bool()).unwrap_or(true);
        let markup = obj
            .get("markup")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let options = obj
            .get("options")
            .and_then(|v| v.as_object())
            .ok_or(RecordError::MissingField { field: "options" })?;

        let frequency_token = options
            .get("frequency")
            .and_then(|v| v.as_str())
            .ok_or(RecordError::MissingField {
                field: "options.frequency",
            })?;
        let frequency =
            Frequency::from_token(frequency_token).ok_or_else(|| RecordError::InvalidField {
                field: "options.frequency",
                message: format!("unknown frequency '{}'", frequency_token),
            })?;

        let trigger_scroll_progress = match options
            .get("trigger_scroll_progress")
            .and_then(|v| v.as_u64())
        {
            Some(p) if p > 100 => {
                return Err(RecordError::InvalidField {
                    field: "options.trigger_scroll_progress",
                    message: format!("{} is out of range 0..=100", p),
                })
            }
            Some(p) => p as u8,
            None => 0,
        };

        let utm_suppression = options
            .get("utm_suppression")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let selected_segment_id = options
            .get("selected_segment_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let categories = term_set(options.get("categories"), "options.categories")?;
        let tags = term_set(options.get("tags"), "options.tags")?;

        let has_newsletter_prompt = options
            .get("has_newsletter_prompt")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let has_donation_block = options
            .get("has_donation_block")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Prompt {
            id,
            placement,
            published,
            markup,
            options: PromptOptions {
                frequency,
                trigger_scroll_progress,
                utm_suppression,
                selected_segment_id,
                categories,
                tags,
                has_newsletter_prompt,
                has_donation_block,
            },
        })
    }
}

fn term_set(
    value: Option<&serde_json::Value>,
    field: &'static str,
) -> Result<BTreeSet<TermId>, RecordError> {
    let Some(value) = value else {
        return Ok(BTreeSet::new());
    };
    let arr = value.as_array().ok_or_else(|| RecordError::InvalidField {
        field,
        message: "expected an array of term ids".to_string(),
    })?;
    let mut terms = BTreeSet::new();
    for item in arr {
        let id = item.as_u64().ok_or_else(|| RecordError::InvalidField {
            field,
            message: format!("non-numeric term id {}", item),
        })?;
        terms.insert(TermId(id));
    }
    Ok(terms)
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from validating a raw catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record is not a JSON object.
    NotAnObject,
    /// A required field is absent.
    MissingField { field: &'static str },
    /// A field is present but malformed.
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotAnObject => write!(f, "prompt record must be a JSON object"),
            RecordError::MissingField { field } => {
                write!(f, "prompt record missing required field '{}'", field)
            }
            RecordError::InvalidField { field, message } => {
                write!(f, "invalid prompt record field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for RecordError {}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
