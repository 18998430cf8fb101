//! story-report - aggregate concurrent story results into one XML report
//!
//! ## Usage
//!
//! ```bash
//! # Replay recorded stories and write a JUnit-style report
//! story-report replay stories.json --output target/junit.xml
//!
//! # Print the report on the console, four stories at a time
//! story-report replay stories.yaml --output console -n 4
//!
//! # Write an example configuration file
//! story-report config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::info;

mod cli;

use cli::Args;
use story_report::config::{print_env_help, EnvConfig, GenerationMode, OutputTarget, ReportConfig};
use story_report::executor::{Coordinator, ParallelReplayer, StoryPlan};
use story_report::models::{CumulativeReport, ScopeAggregate};
use story_report::output::{ConsoleSink, FileSink, OutputFormat, OutputSink, ResultFormatter};
use story_report::utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env_config = EnvConfig::load();
    let mut config = match args.config.as_deref().or(env_config.config_file.as_deref()) {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::load_default()?,
    };
    env_config.apply(&mut config);

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::from_str(&config.log_level).unwrap_or(LogLevel::Info)
    };
    init_logger(level);

    match args.command {
        cli::Command::Replay(replay_args) => {
            replay(replay_args, config).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &config, &env_config)?;
        }
    }

    Ok(())
}

async fn replay(args: cli::ReplayArgs, mut config: ReportConfig) -> Result<()> {
    if let Some(output) = &args.output {
        config.output = OutputTarget::parse(output);
    }
    if let Some(mode) = &args.mode {
        config.generation_mode = GenerationMode::from_str(mode)
            .ok_or_else(|| anyhow::anyhow!("Unknown generation mode: {mode}"))?;
    }
    if let Some(concurrent) = args.concurrent {
        config.max_concurrent = concurrent;
    }
    config.validate()?;

    let stories = StoryPlan::load_all(&args.input)?;
    let preview = preview_report(&stories);

    let sink: Box<dyn OutputSink> = match &config.output {
        OutputTarget::Console => Box::new(ConsoleSink::new()),
        OutputTarget::File(path) => Box::new(
            FileSink::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?,
        ),
    };

    info!(
        "Replaying {} stories from {} ({:?} mode)",
        stories.len(),
        args.input,
        config.generation_mode
    );

    let coordinator = Coordinator::start(sink, &config);
    let outcome = ParallelReplayer::new(config.max_concurrent)
        .replay(&coordinator.handle(), stories)
        .await;
    let summary = coordinator.shutdown().await?;
    let replayed = outcome?;

    if let Some(fatal) = summary.fatal {
        anyhow::bail!("Report pipeline aborted: {fatal}");
    }

    if matches!(config.output, OutputTarget::Console) {
        println!();
    }

    if let Some(format) = args.format.as_deref() {
        let format = OutputFormat::from_str(format)
            .ok_or_else(|| anyhow::anyhow!("Unknown summary format: {format}"))?;
        eprintln!("Input preview (suites in file order):");
        eprintln!("{}", ResultFormatter::new(format).format_report(&preview));
    }

    for emission in &replayed.emissions {
        info!(
            "Generation {}: {} suites, {} bytes written",
            emission.generation, emission.suites, emission.bytes_written
        );
    }

    Ok(())
}

/// Fold the plans locally in file order; totals match the emitted report,
/// suite order may not
fn preview_report(stories: &[StoryPlan]) -> CumulativeReport {
    let mut report = CumulativeReport::new();
    for scope in stories.iter().flat_map(|story| &story.scopes) {
        report.fold(ScopeAggregate::from_records(
            scope.name.clone(),
            scope.results.clone(),
        ));
    }
    report
}

fn manage_config(args: cli::ConfigArgs, config: &ReportConfig, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ReportConfig::example().save(path)?;
            println!("✓ Configuration file created: {output}");
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                println!();
                print_env_help();
            } else {
                let output = if format == "json" {
                    serde_json::to_string_pretty(config)?
                } else {
                    serde_yaml::to_string(config)?
                };
                println!("{output}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_report::output::MemorySink;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_preview_totals_match_emission() {
        let stories: Vec<StoryPlan> = serde_json::from_str(
            r#"[
                {"scopes": [{"name": "empty", "results": []}, {"name": "one", "results": [{}]}]},
                {"scopes": [{"name": "bad", "results": [{"failure": "x"}, {"skipped": true}]}]}
            ]"#,
        )
        .unwrap();
        let preview = preview_report(&stories);

        let coordinator = Coordinator::start(Box::new(MemorySink::new()), &ReportConfig::default());
        let replayed = ParallelReplayer::new(2)
            .replay(&coordinator.handle(), stories)
            .await
            .unwrap();
        coordinator.shutdown().await.unwrap();

        let emission = &replayed.emissions[0];
        assert_eq!(emission.suites, preview.suites().len());
        assert_eq!(
            (emission.tests, emission.failures, emission.skipped),
            (preview.tests(), preview.failures(), preview.skipped())
        );
    }
}
