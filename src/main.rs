use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use release_plan::config;
use release_plan::git::Git2Repository;
use release_plan::graph::ProjectUnit;
use release_plan::orchestrator::{BuildOrchestrator, BumpKind};
use release_plan::ui;

#[derive(Parser)]
#[command(
    name = "release-plan",
    about = "Resolve the current release identity from git state and plan docker build/tag/push actions"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Project root directory")]
    project_dir: PathBuf,

    #[arg(long, help = "Build-type label matched against target predicates")]
    build_type: Option<String>,

    #[arg(long, help = "Force a release target by name, bypassing matching")]
    force_target: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and print the current release identity
    Resolve,

    /// Print the planned action graphs for the project and its children
    Plan {
        #[arg(long, help = "Additional child project directory", value_name = "PATH")]
        child: Vec<PathBuf>,
    },

    /// Bump the patch version, commit, and tag. Requires a clean workspace
    Patch,

    /// Bump the minor version, commit, and tag. Requires a clean workspace
    Minor,

    /// Bump the major version, commit, and tag. Requires a clean workspace
    Major,

    /// Advance the pre-release counter, commit, and tag
    Prerelease {
        #[arg(long, help = "Replace the pre-release identifier")]
        preid: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = config::load_config(args.config.as_deref())?;
    if let Some(build_type) = args.build_type {
        config.build_type = build_type;
    }

    let repo = Git2Repository::discover(&args.project_dir)?;
    let orchestrator = BuildOrchestrator::new(&repo, &config);
    let resolved = orchestrator.resolve(args.force_target.as_deref())?;

    match args.command {
        Command::Resolve => {
            ui::display_resolved(&resolved);
        }
        Command::Plan { child } => {
            ui::display_resolved(&resolved);
            println!();
            let mut units = vec![ProjectUnit::new("root", &args.project_dir)];
            for path in child {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                units.push(ProjectUnit::new(name, &path));
            }
            for (name, graph) in orchestrator.plan_graphs(&resolved, &units)? {
                ui::display_graph(&name, &graph);
            }
        }
        Command::Patch => apply(&orchestrator, &resolved, BumpKind::Patch)?,
        Command::Minor => apply(&orchestrator, &resolved, BumpKind::Minor)?,
        Command::Major => apply(&orchestrator, &resolved, BumpKind::Major)?,
        Command::Prerelease { preid } => {
            apply(&orchestrator, &resolved, BumpKind::PreRelease { pre_id: preid })?
        }
    }
    Ok(())
}

fn apply(
    orchestrator: &BuildOrchestrator<'_, Git2Repository>,
    resolved: &release_plan::orchestrator::ResolvedBuild,
    bump: BumpKind,
) -> Result<()> {
    ui::display_status(&format!(
        "Updating project version from {}",
        resolved.version.canonical()
    ));
    let next = orchestrator.apply_bump(resolved, &bump)?;
    ui::display_success(&format!("Updated project version to {}", next.canonical()));
    Ok(())
}
