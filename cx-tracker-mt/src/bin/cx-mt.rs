use clap::{Arg, Command};
use cx_tracker::{ContentOrigin, html_to_text, token_count};
use cx_tracker_mt::{CxServerProvider, MachineTranslator, MockMode, MockTranslator, SectionTranslator};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct Output<'a> {
    origin: Option<&'a str>,
    html: &'a str,
    notice: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("cx-mt")
        .version("0.1.0")
        .about("Translate a section of HTML with a content translation provider")
        .arg(
            Arg::new("html")
                .help("Section HTML to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (e.g., fr, es, de)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code (default: en)")
                .default_value("en"),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .short('p')
                .help("MT engine, or \"source\" to copy the source")
                .default_value("MinT"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of the server")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the suggestion as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show token counts")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let html = matches.get_one::<String>("html").ok_or("missing html")?;
    let target_locale = matches
        .get_one::<String>("target-locale")
        .ok_or("missing target locale")?;
    let source_locale = matches
        .get_one::<String>("source-locale")
        .ok_or("missing source locale")?;
    let provider_id = matches.get_one::<String>("provider").ok_or("missing provider")?;
    let origin = ContentOrigin::from_engine(Some(provider_id.as_str()));

    let provider: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::named(provider_id, MockMode::Suffix))
    } else if matches!(origin, ContentOrigin::Provider(_)) {
        if std::env::var("CX_SERVER_URL").is_err() {
            eprintln!("❌ CX_SERVER_URL environment variable not set");
            eprintln!("   Set it with: export CX_SERVER_URL=https://cxserver.wikimedia.org");
            eprintln!("   Or use --mock to use mock translator");
            return Err("Missing server URL".into());
        }
        Arc::new(CxServerProvider::from_env(provider_id)?)
    } else {
        Arc::new(MockTranslator::named("Mock", MockMode::NoOp))
    };

    let translator = SectionTranslator::new(source_locale, target_locale).with_provider(provider);
    let suggestion = translator.suggest(html, &origin).await;

    if matches.get_flag("verbose") {
        eprintln!(
            "📝 {} tokens ({}) → {} tokens ({})",
            token_count(&html_to_text(html), source_locale),
            source_locale,
            token_count(&html_to_text(&suggestion.html), target_locale),
            target_locale
        );
    }

    if matches.get_flag("json") {
        let output = Output {
            origin: suggestion.origin.engine(),
            html: &suggestion.html,
            notice: suggestion.notice.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(notice) = &suggestion.notice {
            eprintln!("⚠️  {}", notice);
        }
        println!("{}", suggestion.html);
    }

    Ok(())
}
