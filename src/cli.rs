//! Command-line interface for codeforge
//!
//! This module provides argument parsing and the command entrypoint that
//! drives the pipeline executor in full or selective mode and persists every
//! produced artifact.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::artifacts::{ArtifactWriter, artifact_file_name};
use crate::config::Config;
use codeforge_pipeline::{PipelineExecutor, PipelineRun, StageId, keys};

/// codeforge - staged code generation from a business requirement
#[derive(Parser, Debug)]
#[command(name = "codeforge")]
#[command(about = "Generate, review, improve, and test code from a business requirement")]
#[command(long_about = r#"
codeforge drives a fixed five-stage pipeline against an LLM backend:

  generate -> review -> improve -> test_cases -> unit_tests

Each stage feeds the next; requesting a late stage automatically backfills
whatever earlier outputs are still missing.

EXAMPLES:
  # Run every stage for a requirement
  codeforge -r "write a function that adds two integers"

  # Reuse existing code and run everything downstream of generation
  codeforge -r "add two integers" --code src/add.py --all

  # Only review and improve; code generation is backfilled when needed
  codeforge -r "add two integers" --review --improve

  # Write artifacts somewhere else
  codeforge -r "add two integers" -o build/artifacts

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is discovered by searching upward from CWD for
  .codeforge/config.toml; use --config to point at an explicit file.
  The API key is read at start-up from the environment variable named by
  api_key_env in the [llm] section.

STAGES:
  generate -> review -> improve -> test_cases -> unit_tests
  With no stage flags (and no --all) every stage runs; artifacts land in the
  output directory as generated_code.py, code_review.md, improved_code.py,
  test_cases.md, and unit_tests.py.
"#)]
#[command(version)]
pub struct Cli {
    /// Business requirement to work from (read from stdin when omitted)
    #[arg(short, long)]
    pub requirement: Option<String>,

    /// Path to an existing code file reused as the generated-code artifact
    #[arg(short, long)]
    pub code: Option<PathBuf>,

    /// Produce the code review
    #[arg(short = 'v', long)]
    pub review: bool,

    /// Produce the improved code
    #[arg(short, long)]
    pub improve: bool,

    /// Produce the test-case descriptions
    #[arg(short, long)]
    pub test_cases: bool,

    /// Produce the unit-test code
    #[arg(short, long)]
    pub unit_tests: bool,

    /// Run every stage
    #[arg(short, long)]
    pub all: bool,

    /// Directory artifacts are written to (default: output, or [output] dir
    /// from the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file (overrides discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model override for the LLM provider
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// The explicitly requested stages, or `None` for a full run.
    ///
    /// Mirrors the original surface: `--all`, or no stage flags at all,
    /// means every stage runs.
    #[must_use]
    pub fn selected_targets(&self) -> Option<Vec<StageId>> {
        if self.all {
            return None;
        }

        let mut targets = Vec::new();
        if self.review {
            targets.push(StageId::Review);
        }
        if self.improve {
            targets.push(StageId::Improve);
        }
        if self.test_cases {
            targets.push(StageId::TestCases);
        }
        if self.unit_tests {
            targets.push(StageId::UnitTests);
        }

        if targets.is_empty() { None } else { Some(targets) }
    }
}

/// Install the tracing subscriber for the process.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug level.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI to completion.
///
/// # Errors
///
/// Surfaces configuration, backend, pipeline, and persistence failures to
/// the caller; artifacts produced before a failure are saved first.
pub async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let mut config = Config::discover(cli.config.as_deref(), &cwd)?;

    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.llm.temperature = temperature;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }

    let requirement = match &cli.requirement {
        Some(text) => text.clone(),
        None => read_requirement_from_stdin()?,
    };
    anyhow::ensure!(
        !requirement.trim().is_empty(),
        "business requirement must not be empty"
    );

    let backend = codeforge_llm::from_config(&config.backend_config()?)?;
    let executor = PipelineExecutor::new(codeforge_stages::registry(), backend, config.sampling());
    let mut run = PipelineRun::new(requirement);

    if let Some(path) = &cli.code {
        let code = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read code file {}", path.display()))?;
        run.store_mut().set(keys::GENERATED_CODE, code);
    }

    let outcome = match cli.selected_targets() {
        None => executor.run_full(&mut run).await,
        Some(targets) => executor.run_selected(&mut run, &targets).await,
    };

    // Persist whatever was produced, even when a later stage failed: the
    // earlier artifacts stay valid and reusable.
    let writer = ArtifactWriter::new(&config.output.dir);
    for id in run.executed() {
        if let Some(content) = run.store().get(id.output_key()) {
            let path = writer.save(artifact_file_name(*id), content)?;
            println!("{} -> {}", id, path.display());
        }
    }

    outcome.map_err(|err| {
        anyhow::Error::from(err).context("pipeline invocation failed")
    })?;

    Ok(())
}

fn read_requirement_from_stdin() -> Result<String> {
    print!("Business requirement: ");
    std::io::stdout()
        .flush()
        .context("failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read requirement from stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("codeforge").chain(args.iter().copied()))
    }

    #[test]
    fn no_stage_flags_means_full_run() {
        let cli = parse(&["-r", "req"]);
        assert_eq!(cli.selected_targets(), None);
    }

    #[test]
    fn all_flag_means_full_run_even_with_stage_flags() {
        let cli = parse(&["-r", "req", "--all", "--review"]);
        assert_eq!(cli.selected_targets(), None);
    }

    #[test]
    fn stage_flags_select_targets_in_stage_order() {
        let cli = parse(&["-r", "req", "--unit-tests", "--review"]);
        assert_eq!(
            cli.selected_targets(),
            Some(vec![StageId::Review, StageId::UnitTests])
        );
    }

    #[test]
    fn short_flags_mirror_the_original_surface() {
        let cli = parse(&["-r", "req", "-v", "-i", "-t", "-u", "-o", "artifacts"]);
        assert!(cli.review && cli.improve && cli.test_cases && cli.unit_tests);
        assert_eq!(cli.output_dir, Some(PathBuf::from("artifacts")));
    }
}
