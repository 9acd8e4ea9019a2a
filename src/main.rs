use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use youtube_summary::cli::{interactive, Cli, Commands};
use youtube_summary::config::Config;
use youtube_summary::output::{self, ExportSelection, FontChoice};
use youtube_summary::session::{reduce, Action, Session, SummaryStyle};
use youtube_summary::summarize::{GeminiGenerator, SummaryWorkflow};
use youtube_summary::transcript::youtube::YoutubeTranscriptProvider;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "youtube_summary=debug"
    } else {
        "youtube_summary=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Summarize {
            link,
            style: summary_style,
            word_limit,
            output_dir,
            txt,
            pdf,
        } => {
            let workflow = build_workflow(&config, cli.quiet)?;

            let mut actions = vec![Action::SetLink(link), Action::SelectStyle(summary_style)];
            if let Some(limit) = word_limit {
                actions.push(Action::SetUseWordLimit(true));
                actions.push(Action::SetWordLimitValue(limit));
            }
            let session = actions.into_iter().fold(Session::default(), reduce);

            let outcome = workflow.summarize(session).await;
            if let Some(error) = outcome.error {
                output::print_error(&error);
                std::process::exit(1);
            }

            output::print_summary(&outcome.session);

            if let Some(dir) = output_dir.or(config.export.output_dir.clone()) {
                let font = FontChoice::probe(&config.export.font_path);
                let files = output::downloads(&outcome.session, ExportSelection::from_flags(txt, pdf), &font)?;
                for file in files {
                    let path = file.save_to(&dir)?;
                    println!(
                        "Saved {} ({})",
                        path.display(),
                        youtube_summary::utils::format_file_size(file.data.len() as u64)
                    );
                }
            }
        }
        Commands::Interactive => {
            let workflow = build_workflow(&config, cli.quiet)?;
            let font = FontChoice::probe(&config.export.font_path);
            interactive::run(&workflow, &font, config.export.output_dir.clone()).await?;
        }
        Commands::Styles => {
            println!("Summary styles:");
            for summary_style in SummaryStyle::ALL {
                let instruction = match summary_style.instruction() {
                    "" => "(no extra instruction)",
                    text => text,
                };
                println!("  • {}: {}", style(summary_style).bold(), instruction);
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let Some(path) = cli.config.or_else(Config::config_path) else {
                    anyhow::bail!("Could not determine config directory; use --config <FILE>");
                };
                if !path.exists() {
                    config.save(&path)?;
                    println!("Wrote default configuration.");
                }
                println!("Edit the configuration file to change settings:");
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

/// Resolve the API key and wire up the providers; a missing key is fatal
fn build_workflow(config: &Config, quiet: bool) -> Result<SummaryWorkflow> {
    let api_key = config.require_api_key()?;

    let transcripts = YoutubeTranscriptProvider::new(&config.transcript)?;
    let generator = GeminiGenerator::new(&config.gemini, api_key)?;

    let workflow = SummaryWorkflow::new(Box::new(transcripts), Box::new(generator));
    Ok(if quiet { workflow.quiet() } else { workflow })
}
