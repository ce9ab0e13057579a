mod error;
mod export;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tw_project::Project;
use tw_rlc::AnalyticCalculator;
use tw_solver::{LumpedModel, ModelKind, MtlModel, ResponseModel, Sweep};
use tw_winding::Topology;

use crate::error::{CliError, CliResult};
use crate::export::{SweepExport, to_csv};

#[derive(Parser)]
#[command(name = "tw-cli")]
#[command(about = "Transformer winding frequency response", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Mtl,
    Lumped,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file and build its topology
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Print turns, nodes and terminals of a project
    Info {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Run a frequency sweep
    Sweep {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Model to evaluate (defaults to the project's choice)
        #[arg(long, value_enum)]
        model: Option<ModelArg>,
        /// Number of frequencies
        #[arg(long)]
        steps: Option<usize>,
        /// Worker threads
        #[arg(long)]
        jobs: Option<usize>,
        /// Output file, .csv or .json (CSV to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Info { project_path } => cmd_info(&project_path),
        Commands::Sweep {
            project_path,
            model,
            steps,
            jobs,
            output,
        } => cmd_sweep(&project_path, model, steps, jobs, output.as_deref()),
    }
}

fn load_project(path: &Path) -> CliResult<Project> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let project = if is_json {
        tw_project::load_json(path)?
    } else {
        tw_project::load_yaml(path)?
    };
    Ok(project)
}

fn load_topology(project: &Project) -> CliResult<Topology> {
    Ok(tw_project::build_transformer(project)?.finalize()?)
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_project(project_path)?;
    let topology = load_topology(&project)?;
    println!(
        "✓ Project is valid ({} turns, {} nodes)",
        topology.num_turns(),
        topology.num_nodes()
    );
    Ok(())
}

fn cmd_info(project_path: &Path) -> CliResult<()> {
    let project = load_project(project_path)?;
    let topology = load_topology(&project)?;

    println!("Project: {}", project.name);
    println!("  Turns: {}", topology.num_turns());
    println!("  Nodes: {}", topology.num_nodes());
    println!("  Branches: {}", topology.branches().len());

    println!("\nWindings:");
    for winding in topology.windings() {
        println!("  {}", winding.label());
        for &id in winding.segments() {
            let segment = topology.segment(id)?;
            let branches = topology.segment_branches(id).count();
            println!(
                "    {} - {} ({} turns, {} branches)",
                segment.label(),
                segment.geometry().kind_name(),
                segment.num_turns(),
                branches
            );
        }
    }

    println!("\nNodes:");
    for (i, node) in topology.nodes().enumerate() {
        let touching = topology.graph().touching(node.id).len();
        println!("  {i}: {} ({touching} entities)", node.display_name());
    }

    println!("\nTerminals:");
    for terminal in topology.terminals() {
        let (r, l) = terminal.kind.impedance().si();
        let role = if terminal.kind.is_source() {
            "source"
        } else {
            "load"
        };
        println!(
            "  {} - {} at node {} (R={} ohm, L={} H)",
            terminal.label,
            role,
            topology.node_index(terminal.node)?,
            r,
            l
        );
    }
    Ok(())
}

fn cmd_sweep(
    project_path: &Path,
    model: Option<ModelArg>,
    steps: Option<usize>,
    jobs: Option<usize>,
    output: Option<&Path>,
) -> CliResult<()> {
    let project = load_project(project_path)?;
    let topology = load_topology(&project)?;
    let calculator = AnalyticCalculator::new(tw_project::analytic_config(&project))?;

    let mut config = tw_project::sweep_config(&project);
    if let Some(steps) = steps {
        config.num_steps = steps;
    }
    if let Some(jobs) = jobs {
        config.parallelism = jobs;
    }
    let kind = match model {
        Some(ModelArg::Mtl) => ModelKind::Mtl,
        Some(ModelArg::Lumped) => ModelKind::Lumped,
        None => tw_project::model_kind(&project),
    };

    let response_model: Box<dyn ResponseModel + '_> = match kind {
        ModelKind::Mtl => Box::new(MtlModel::new(
            &topology,
            &calculator,
            tw_project::mtl_config(&project),
        )?),
        ModelKind::Lumped => Box::new(LumpedModel::new(
            &topology,
            &calculator,
            tw_project::lumped_config(&project),
        )?),
    };

    info!(
        model = kind.as_str(),
        turns = topology.num_turns(),
        steps = config.num_steps,
        "starting sweep"
    );
    let started = Instant::now();
    let result = Sweep::new(config)?
        .with_progress(&render_progress)
        .run(response_model.as_ref())?;
    clear_progress_line();

    // stdout may carry the CSV, so status goes to stderr
    eprintln!(
        "✓ Sweep completed: {}/{} frequencies solved in {:.2}s",
        result.solved_count(),
        result.samples.len(),
        started.elapsed().as_secs_f64()
    );
    for (i, freq, reason) in result.failures() {
        eprintln!("  sample {i} at {freq:.3e} Hz failed: {reason}");
    }

    match output {
        None => print!("{}", to_csv(&result)),
        Some(path) => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            let content = match ext.as_deref() {
                Some("csv") => to_csv(&result),
                Some("json") => {
                    serde_json::to_string_pretty(&SweepExport::new(&project.name, &result))?
                }
                _ => {
                    return Err(CliError::InvalidInput(format!(
                        "output must end in .csv or .json: {}",
                        path.display()
                    )));
                }
            };
            std::fs::write(path, content)?;
            eprintln!("✓ Wrote {}", path.display());
        }
    }
    Ok(())
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(60));
    let _ = io::stderr().flush();
}

fn render_progress(percent: u32) {
    let width = 28usize;
    let filled = ((percent as usize * width) / 100).min(width);
    eprint!(
        "\r[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    );
    let _ = io::stderr().flush();
}
