use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use marquee_core::ViewingContext;
use marquee_engine::{
    access_provider, access_script_tag, extract_ids, insert_prompts_in_content, ParagraphBlocks,
    RenderSession,
};
use marquee_storage::{MemoryCatalog, MemorySettings, MemoryWidgetIndex, Setting};

/// Marquee prompt placement toolchain.
#[derive(Parser)]
#[command(name = "marquee", version, about = "Marquee prompt placement engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject eligible prompts into post content
    Render {
        /// Path to the post content file
        content: PathBuf,
        /// Path to the prompt catalog (JSON array of prompt records)
        #[arg(long)]
        catalog: PathBuf,
        /// Path to the viewing context JSON (defaults to a single post view)
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Print the amp-access script tag for a page view
    Payload {
        /// Path to the prompt catalog (JSON array of prompt records)
        #[arg(long)]
        catalog: PathBuf,
        /// Path to the viewing context JSON (defaults to a single post view)
        #[arg(long)]
        context: Option<PathBuf>,
        /// Path to the settings JSON (array of key/value records)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Authorization endpoint the access script calls
        #[arg(long, default_value = "/marquee/api/authorize")]
        endpoint: String,
        /// Path to the post content file, scanned for manual shortcodes
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Print prompt ids referenced by shortcodes in a file, one per line
    ExtractIds {
        /// Path to the file to scan
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            content,
            catalog,
            context,
        } => cmd_render(&content, &catalog, context.as_deref()),
        Commands::Payload {
            catalog,
            context,
            settings,
            endpoint,
            content,
        } => cmd_payload(
            &catalog,
            context.as_deref(),
            settings.as_deref(),
            &endpoint,
            content.as_deref(),
        ),
        Commands::ExtractIds { file } => cmd_extract_ids(&file),
    }
}

fn cmd_render(content_path: &Path, catalog_path: &Path, context_path: Option<&Path>) {
    let catalog = load_catalog(catalog_path);
    let ctx = load_context(context_path);
    let content = read_file(content_path);

    let mut session = RenderSession::new();
    let output = insert_prompts_in_content(&mut session, &catalog, &ParagraphBlocks, &ctx, &content);
    println!("{}", output);
}

fn cmd_payload(
    catalog_path: &Path,
    context_path: Option<&Path>,
    settings_path: Option<&Path>,
    endpoint: &str,
    content_path: Option<&Path>,
) {
    let catalog = load_catalog(catalog_path);
    let ctx = load_context(context_path);
    let settings = MemorySettings::new(load_settings(settings_path));
    let widgets = MemoryWidgetIndex::default();
    let content = content_path.map(read_file).unwrap_or_default();

    match access_provider(&catalog, &settings, &widgets, &ctx, &content, endpoint) {
        Ok(provider) => println!("{}", access_script_tag(&provider)),
        Err(e) => {
            eprintln!("payload error: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_extract_ids(path: &Path) {
    let text = read_file(path);
    for id in extract_ids(&text) {
        println!("{}", id);
    }
}

// ──────────────────────────────────────────────
// Fixture loading
// ──────────────────────────────────────────────

fn read_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn load_catalog(path: &Path) -> MemoryCatalog {
    let raw = read_file(path);
    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error parsing JSON in '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    match MemoryCatalog::from_records(&records) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("invalid catalog '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn load_context(path: Option<&Path>) -> ViewingContext {
    let Some(path) = path else {
        return ViewingContext::default();
    };
    let raw = read_file(path);
    match serde_json::from_str(&raw) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error parsing context '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn load_settings(path: Option<&Path>) -> Vec<Setting> {
    let Some(path) = path else {
        return Vec::new();
    };
    let raw = read_file(path);
    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error parsing settings '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
