//! The access payload: the compact per-page configuration consumed by the
//! client-side access-control script.
//!
//! Keys are deliberately abbreviated -- the whole payload travels inside
//! the authorization URL's query string on every page view.

use serde::Serialize;

use marquee_core::{Frequency, Prompt, ViewingContext};
use marquee_storage::{PromptCatalog, SettingsStore, StorageError, WidgetIndexStore};

use crate::select::prompts_for_view;
use crate::shortcode::extract_ids;
use crate::widgets::all_widget_prompt_ids;

/// Namespace of the access provider, matched by the client script.
pub const ACCESS_NAMESPACE: &str = "prompts";

/// Cookie holding the reader's client id; interpolated into the
/// authorization URL as a `CLIENT_ID(...)` placeholder the client
/// substitutes at request time.
pub const CLIENT_ID_COOKIE: &str = "marquee-cid";

/// Per-prompt descriptor. Field names are the wire keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptConfig {
    /// Identifier-safe prompt key (`id_<n>`).
    pub id: String,
    /// Display frequency. Overlays authored as `always` are downgraded to
    /// `once`: an overlay that reappears on every pageview is never
    /// intended.
    pub f: Frequency,
    /// UTM suppression flag.
    pub utm: bool,
    /// Selected segment id, if any.
    pub s: Option<String>,
    /// Prompt body contains a newsletter signup.
    pub n: bool,
    /// Prompt body contains a donation block.
    pub d: bool,
    /// Type code: `i` inline, `o` overlay, `a` above-header.
    pub t: char,
}

/// Page-level visit descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitDescriptor {
    pub post_id: u64,
    /// Comma-joined category term ids.
    pub categories: String,
    pub is_post: bool,
}

/// The provider entry emitted into the page's `amp-access` script block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessProvider {
    pub namespace: &'static str,
    pub authorization: String,
    #[serde(rename = "noPingback")]
    pub no_pingback: bool,
}

/// Build the wire descriptor for one prompt.
pub fn prompt_access_payload(prompt: &Prompt) -> PromptConfig {
    let mut frequency = prompt.options.frequency;
    let t = if prompt.placement.is_above_header() {
        'a'
    } else if prompt.placement.is_overlay() {
        if frequency == Frequency::Always {
            frequency = Frequency::Once;
        }
        'o'
    } else {
        'i'
    };

    PromptConfig {
        id: prompt.canonical_id(),
        f: frequency,
        utm: prompt.options.utm_suppression,
        s: prompt.options.selected_segment_id.clone(),
        n: prompt.options.has_newsletter_prompt,
        d: prompt.options.has_donation_block,
        t,
    }
}

/// Assemble the access provider for the current view.
///
/// Covers the auto-selected prompts plus any prompt referenced by manual
/// shortcode in the content or in a recorded widget -- those render
/// outside the automatic pass but the client still needs their config.
/// Shortcoded ids that no longer resolve in the catalog are dropped.
pub fn access_provider(
    catalog: &dyn PromptCatalog,
    settings: &dyn SettingsStore,
    widgets: &dyn WidgetIndexStore,
    ctx: &ViewingContext,
    content: &str,
    endpoint: &str,
) -> Result<AccessProvider, StorageError> {
    let mut prompts = prompts_for_view(catalog, ctx)?;

    let mut shortcoded = extract_ids(content);
    shortcoded.extend(all_widget_prompt_ids(widgets)?);
    for id in shortcoded {
        if prompts.iter().any(|p| p.id == id) {
            continue;
        }
        if let Some(prompt) = catalog.retrieve_prompt_by_id(id, ctx.viewing_as())? {
            prompts.push(prompt);
        }
    }

    let configs: Vec<PromptConfig> = prompts.iter().map(prompt_access_payload).collect();

    let mut settings_object = serde_json::Map::new();
    for setting in settings.get_settings()? {
        settings_object.insert(setting.key, setting.value);
    }

    let categories = ctx
        .categories
        .iter()
        .map(|term| term.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let visit = VisitDescriptor {
        post_id: ctx.post_id,
        categories,
        is_post: ctx.is_single,
    };

    let mut authorization = format!(
        "{}?cid=CLIENT_ID({})&ref=DOCUMENT_REFERRER&popups={}&settings={}&visit={}",
        endpoint,
        CLIENT_ID_COOKIE,
        json(&configs),
        json(&serde_json::Value::Object(settings_object)),
        json(&visit),
    );
    if let Some(view_as) = &ctx.view_as {
        authorization.push_str("&view_as=");
        authorization.push_str(&json(&view_as.raw));
    }

    Ok(AccessProvider {
        namespace: ACCESS_NAMESPACE,
        authorization,
        no_pingback: true,
    })
}

/// The script element the host prints into the page head.
pub fn access_script_tag(provider: &AccessProvider) -> String {
    format!(
        "<script id=\"amp-access\" type=\"application/json\">{}</script>",
        json(provider)
    )
}

// Serialization of these wire structs cannot fail; keep call sites terse.
fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::{TermId, ViewAsSpec};
    use marquee_storage::{MemoryCatalog, MemorySettings, MemoryWidgetIndex, Setting};
    use serde_json::json as j;

    fn prompt(id: u64, placement: &str, frequency: &str) -> Prompt {
        Prompt::from_record(&j!({
            "id": id,
            "placement": placement,
            "options": { "frequency": frequency }
        }))
        .unwrap()
    }

    #[test]
    fn overlay_always_downgrades_to_once() {
        let config = prompt_access_payload(&prompt(3, "overlay-generic", "always"));
        assert_eq!(config.f, Frequency::Once);
        assert_eq!(config.t, 'o');
        assert_eq!(config.id, "id_3");
    }

    #[test]
    fn inline_frequency_untouched() {
        let config = prompt_access_payload(&prompt(3, "inline", "always"));
        assert_eq!(config.f, Frequency::Always);
        assert_eq!(config.t, 'i');
    }

    #[test]
    fn above_header_type_code_wins() {
        let config = prompt_access_payload(&prompt(3, "above-header", "always"));
        assert_eq!(config.t, 'a');
        // Only overlays downgrade.
        assert_eq!(config.f, Frequency::Always);
    }

    #[test]
    fn config_wire_keys_are_abbreviated() {
        let config = prompt_access_payload(&prompt(3, "overlay-category", "always"));
        let wire = serde_json::to_value(&config).unwrap();
        assert_eq!(
            wire,
            j!({
                "id": "id_3",
                "f": "once",
                "utm": false,
                "s": null,
                "n": false,
                "d": false,
                "t": "o"
            })
        );
    }

    #[test]
    fn provider_url_carries_all_sections() {
        let catalog = MemoryCatalog::new(vec![prompt(1, "overlay-generic", "once")]);
        let settings = MemorySettings::new(vec![Setting {
            key: "suppress_all".to_string(),
            value: j!(false),
        }]);
        let widgets = MemoryWidgetIndex::default();
        let mut ctx = ViewingContext::single_post(12);
        ctx.categories = [TermId(5), TermId(8)].into_iter().collect();

        let provider = access_provider(
            &catalog,
            &settings,
            &widgets,
            &ctx,
            "",
            "https://example.org/api/reader",
        )
        .unwrap();

        assert_eq!(provider.namespace, "prompts");
        assert!(provider.no_pingback);
        assert!(provider
            .authorization
            .starts_with("https://example.org/api/reader?cid=CLIENT_ID(marquee-cid)&ref=DOCUMENT_REFERRER&popups="));
        assert!(provider.authorization.contains("\"id\":\"id_1\""));
        assert!(provider
            .authorization
            .contains("&settings={\"suppress_all\":false}"));
        assert!(provider.authorization.contains(
            "&visit={\"post_id\":12,\"categories\":\"5,8\",\"is_post\":true}"
        ));
        assert!(!provider.authorization.contains("view_as"));
    }

    #[test]
    fn view_as_appended_verbatim() {
        let catalog = MemoryCatalog::new(vec![]);
        let settings = MemorySettings::default();
        let widgets = MemoryWidgetIndex::default();
        let mut ctx = ViewingContext::single_post(1);
        ctx.view_as = ViewAsSpec::parse("segment:donors;show_unpublished:true");

        let provider =
            access_provider(&catalog, &settings, &widgets, &ctx, "", "https://e/api").unwrap();
        assert!(provider
            .authorization
            .ends_with("&view_as=\"segment:donors;show_unpublished:true\""));
    }

    #[test]
    fn shortcoded_prompts_join_the_payload() {
        // Prompt 7 is manual: never auto-selected, but present in content
        // via shortcode, so the client still needs its config.
        let catalog = MemoryCatalog::new(vec![
            prompt(1, "inline", "always"),
            prompt(7, "inline", "manual"),
        ]);
        let settings = MemorySettings::default();
        let widgets = MemoryWidgetIndex::default();
        let ctx = ViewingContext::single_post(1);

        let provider = access_provider(
            &catalog,
            &settings,
            &widgets,
            &ctx,
            "intro [marquee-prompt id=\"7\"] outro",
            "https://e/api",
        )
        .unwrap();
        assert!(provider.authorization.contains("\"id\":\"id_1\""));
        assert!(provider.authorization.contains("\"id\":\"id_7\""));
    }

    #[test]
    fn widget_recorded_prompts_join_the_payload() {
        let catalog = MemoryCatalog::new(vec![prompt(9, "inline", "manual")]);
        let settings = MemorySettings::default();
        let widgets = MemoryWidgetIndex::default();
        crate::widgets::save_widget(&widgets, "sidebar-1", "text", "[marquee-prompt id=\"9\"]")
            .unwrap();
        let ctx = ViewingContext::single_post(1);

        let provider =
            access_provider(&catalog, &settings, &widgets, &ctx, "", "https://e/api").unwrap();
        assert!(provider.authorization.contains("\"id\":\"id_9\""));
    }

    #[test]
    fn unresolvable_shortcoded_ids_dropped() {
        let catalog = MemoryCatalog::new(vec![]);
        let settings = MemorySettings::default();
        let widgets = MemoryWidgetIndex::default();
        let ctx = ViewingContext::single_post(1);

        let provider = access_provider(
            &catalog,
            &settings,
            &widgets,
            &ctx,
            "[marquee-prompt id=\"404\"]",
            "https://e/api",
        )
        .unwrap();
        assert!(provider.authorization.contains("&popups=[]"));
    }

    #[test]
    fn script_tag_wraps_provider_json() {
        let provider = AccessProvider {
            namespace: ACCESS_NAMESPACE,
            authorization: "https://e/api?cid=CLIENT_ID(marquee-cid)".to_string(),
            no_pingback: true,
        };
        let tag = access_script_tag(&provider);
        assert!(tag.starts_with("<script id=\"amp-access\" type=\"application/json\">"));
        assert!(tag.ends_with("</script>"));
        assert!(tag.contains("\"namespace\":\"prompts\""));
        assert!(tag.contains("\"noPingback\":true"));
    }
}
