//! Marquee placement engine -- decides which prompts a page view gets,
//! where they land in the content, and what configuration the client
//! access script receives.
//!
//! The pipeline: viewing context -> selection (`select`) -> eligibility
//! (`eligibility`) -> partition (`partition`) -> injection (`inject`),
//! with the access payload (`payload`) built independently from the same
//! selection. The shortcode mini-parser (`shortcode`) and the widget
//! index tracker (`widgets`) feed both the injector's duplicate
//! suppression and the payload's manual-prompt inclusion.
//!
//! Everything is synchronous and request-scoped; the only cross-request
//! state is the widget index behind `marquee_storage::WidgetIndexStore`.

pub mod blocks;
pub mod eligibility;
pub mod inject;
pub mod partition;
pub mod payload;
pub mod select;
pub mod shortcode;
pub mod widgets;

pub use blocks::{Block, BlockEngine, ParagraphBlocks};
pub use eligibility::should_display;
pub use inject::{
    insert_prompts_in_content, prompts_after_header, prompts_before_header, render_shortcode,
    RenderSession,
};
pub use partition::{partition, InlinePlacement};
pub use payload::{
    access_provider, access_script_tag, prompt_access_payload, AccessProvider, PromptConfig,
    VisitDescriptor,
};
pub use select::prompts_for_view;
pub use shortcode::extract_ids;
pub use widgets::{all_widget_prompt_ids, remove_widget, save_widget};
