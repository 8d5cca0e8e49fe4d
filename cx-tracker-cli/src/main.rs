//! Replay a saved translation through the tracker and report its state

use clap::Parser;
use cx_tracker::{
    ContentOrigin, IssueTarget, JsonFileStore, MemoryEditor, SavedUnits, SourceDocument,
    StructuredEditor, Tracker, TrackerConfig, TranslationProgress, TranslationStore,
};
use cx_tracker_mt::{
    CxServerProvider, MachineTranslator, MockMode, MockTranslator, SectionTranslator,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cx-progress", version, about = "Translation progress and MT abuse report")]
struct Args {
    /// Source document JSON: {"title": ..., "sections": [{"number": 0, "html": ...}]}
    source: PathBuf,

    /// Directory of saved translations
    #[arg(long)]
    store: Option<PathBuf>,

    /// Translation id inside the store
    #[arg(long, default_value = "translation")]
    translation: String,

    /// Tracker configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    from: Option<String>,

    #[arg(long)]
    to: Option<String>,

    /// Start sections without a saved translation from this provider ("source" copies)
    #[arg(long)]
    fill: Option<String>,

    /// Use the mock translator for --fill
    #[arg(long)]
    mock: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SectionRow {
    section: u32,
    provider: Option<String>,
    progress: f64,
    unmodified: f64,
    modified: bool,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct Report {
    title: String,
    sections: Vec<SectionRow>,
    progress: TranslationProgress,
    nodes_with_issues: Vec<String>,
    can_publish: bool,
    notices: Vec<String>,
}

async fn fill_sections(
    args: &Args,
    provider_id: &str,
    config: &TrackerConfig,
    document: &SourceDocument,
    saved: &SavedUnits,
    editor: &mut MemoryEditor,
) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let origin = ContentOrigin::from_engine(Some(provider_id));
    let mut translator = SectionTranslator::new(&config.source_language, &config.target_language);
    if let ContentOrigin::Provider(id) = &origin {
        let provider: Arc<dyn MachineTranslator> = if args.mock {
            Arc::new(MockTranslator::named(id, MockMode::Suffix))
        } else {
            Arc::new(CxServerProvider::from_env(id)?)
        };
        translator = translator.with_provider(provider);
    }

    let mut filled = Vec::new();
    for section in document.sections() {
        if saved.contains_key(&section.number) {
            continue;
        }
        let suggestion = translator.suggest(&section.html, &origin).await;
        if let Some(notice) = &suggestion.notice {
            editor.notify(notice);
        }
        editor.set_section(section.number, &suggestion.html, suggestion.origin);
        filled.push(section.number);
    }
    info!(count = filled.len(), provider = provider_id, "Filled untranslated sections");
    Ok(filled)
}

fn print_report(report: &Report) {
    println!("📄 {}", report.title);
    println!(
        "{:>7}  {:<10} {:>8} {:>10}  {:<8} issues",
        "section", "provider", "progress", "unmodified", "modified"
    );
    for row in &report.sections {
        println!(
            "{:>7}  {:<10} {:>7.0}% {:>9.0}%  {:<8} {}",
            row.section,
            row.provider.as_deref().unwrap_or("-"),
            row.progress * 100.0,
            row.unmodified * 100.0,
            row.modified,
            row.issues.join(", ")
        );
    }
    println!();
    println!(
        "Progress: {:.0}% ({:.0}% human, {:.0}% MT), {} of {} sections translated",
        report.progress.any * 100.0,
        report.progress.human * 100.0,
        report.progress.mt * 100.0,
        report.progress.translated_sections_count,
        report.sections.len()
    );
    if !report.nodes_with_issues.is_empty() {
        println!("Issues on: {}", report.nodes_with_issues.join(", "));
    }
    for notice in &report.notices {
        println!("⚠️  {}", notice);
    }
    println!(
        "Publishing: {}",
        if report.can_publish { "✅ enabled" } else { "❌ disabled" }
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(from) = &args.from {
        config.source_language = from.clone();
    }
    if let Some(to) = &args.to {
        config.target_language = to.clone();
    }
    config.validate()?;

    let document = SourceDocument::from_file(&args.source)?;
    let store = args.store.as_ref().map(JsonFileStore::new);
    let (saved, persisted) = match &store {
        Some(store) => (
            store.load_saved_translation_units(&args.translation).await?,
            store.load_progress(&args.translation).await?,
        ),
        None => (SavedUnits::new(), None),
    };

    let mut editor = MemoryEditor::new();
    for (number, unit) in &saved {
        editor.set_section(*number, &unit.user.content, unit.origin());
    }
    let filled = match &args.fill {
        Some(provider_id) => {
            fill_sections(&args, provider_id, &config, &document, &saved, &mut editor).await?
        }
        None => Vec::new(),
    };

    let mut tracker = Tracker::new(config, &document, &saved, persisted, editor)?;
    let now = Instant::now();
    for number in filled {
        tracker.on_section_change(number, now);
    }
    tracker.flush(now);
    let readiness = tracker.publish_readiness();

    if let Some(store) = &store {
        for (number, unit) in tracker.take_save_queue() {
            store.save(&args.translation, number, &unit).await?;
        }
        store
            .save_progress(&args.translation, &tracker.current_progress())
            .await?;
    }

    let sections = tracker
        .sections()
        .map(|state| {
            let metrics = state.metrics().copied().unwrap_or_default();
            SectionRow {
                section: state.section_number(),
                provider: state.current_provider().engine().map(str::to_string),
                progress: metrics.translation_progress,
                unmodified: metrics.unmodified_percentage,
                modified: metrics.is_modified,
                issues: tracker
                    .editor()
                    .issues(IssueTarget::Section(state.section_number()))
                    .iter()
                    .map(|issue| issue.message.clone())
                    .collect(),
            }
        })
        .collect();

    let report = Report {
        title: document.title().to_string(),
        sections,
        progress: tracker.current_progress(),
        nodes_with_issues: tracker
            .nodes_with_issues()
            .iter()
            .map(ToString::to_string)
            .collect(),
        can_publish: readiness.can_publish,
        notices: tracker.editor().notifications().to_vec(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
