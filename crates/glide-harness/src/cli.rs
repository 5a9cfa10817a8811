use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use glide_core::CarouselConfig;

use crate::error::{HarnessError, Result};
use crate::script::{Script, ScriptReport, run_script};

#[derive(Debug, Parser)]
#[command(
    name = "glide-harness",
    about = "Replay carousel scenarios against a deterministic virtual host",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON scenario script and print the report.
    Run(RunArgs),

    /// Print the default carousel configuration as TOML.
    Defaults,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario script (JSON).
    pub script: PathBuf,

    /// Carousel config file (TOML, or JSON by `.json` extension); overrides
    /// the script's own config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(&args),
        Commands::Defaults => {
            print!("{}", CarouselConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn run_command(args: &RunArgs) -> Result<()> {
    let script = Script::from_file(&args.script)?;
    let config = args.config.as_deref().map(load_config).transpose()?;
    let report = run_script(&script, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_summary(&report));
    }

    if report.leaks.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::LeakDetected {
            count: report.leaks.len(),
        })
    }
}

pub fn load_config(path: &Path) -> Result<CarouselConfig> {
    if !path.exists() {
        return Err(HarnessError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        CarouselConfig::from_json_file(path)?
    } else {
        CarouselConfig::from_toml_file(path)?
    };
    Ok(config)
}

#[must_use]
pub fn render_summary(report: &ScriptReport) -> String {
    let mut out = String::new();
    let Some(state) = &report.final_state else {
        out.push_str(&format!(
            "slides={} rendered=false (nothing to drive)\n",
            report.slides
        ));
        return out;
    };
    out.push_str(&format!(
        "slides={} active={} direction={} dragging={} disposed={}\n",
        report.slides, state.active_slide, state.direction, state.dragging, state.disposed
    ));
    out.push_str(&format!(
        "elapsed={:.3}ms paints={} commits={} ticks={} displayed={}px\n",
        report.elapsed_ms,
        report.paints.len(),
        report.commits,
        report.ticks,
        state.displayed_px
    ));
    if !report.dropped.is_empty() || report.unmapped_inputs > 0 {
        out.push_str(&format!(
            "dropped={} unmapped={}\n",
            report.dropped.len(),
            report.unmapped_inputs
        ));
    }
    for ignored in &report.ignored {
        out.push_str(&format!("ignored step {}: {}\n", ignored.step, ignored.reason));
    }
    for leak in &report.leaks {
        out.push_str(&format!("LEAK {leak}\n"));
    }
    out
}
