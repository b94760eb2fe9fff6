//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{Format, OrgSnapshot};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::{
    build_forest, Collaborator, CollaboratorId, DomainError, HierarchyGraph, LevelId, SectorId,
    NEW_COLLABORATOR_ID,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::ForestConvert;

/// Run the parsed command line.
pub fn execute(cli: Cli) -> CliResult<()> {
    let Some(command) = cli.command else {
        return Err(CliError::Usage(
            "no command given, see `orgchart --help`".into(),
        ));
    };

    // Commands that must work even with a broken config.
    match &command {
        Commands::Completion { shell } => return cmd_completion(*shell),
        Commands::Config {
            command: ConfigCommands::Template,
        } => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("resolve cwd", e))?,
    };
    let settings = match &cli.config {
        Some(path) => Settings::load_file(path)?,
        None => Settings::load(Some(&project_dir))?,
    };
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Layout {
            file,
            expand,
            reveal,
            expand_all,
            depth,
            format,
            output,
        } => cmd_layout(
            &container,
            file,
            LayoutRequest {
                expand,
                reveal,
                expand_all,
                depth,
            },
            format,
            output,
        ),
        Commands::Eligible {
            file,
            node,
            sector,
            level,
            format,
        } => cmd_eligible(&container, file, node, sector, level, format),
        Commands::Check { file } => cmd_check(&container, file),
        Commands::Tree { file, ids } => cmd_tree(&container, file, ids),
        Commands::Descendants { file, node } => cmd_descendants(&container, file, node),
        Commands::Search { query, file } => cmd_search(&container, file, &query),
        Commands::Config { command } => cmd_config(&container, command, &project_dir),
        Commands::Completion { shell } => cmd_completion(shell),
    }
}

/// Expansion flags of the `layout` command.
#[derive(Debug, Default)]
struct LayoutRequest {
    expand: Vec<CollaboratorId>,
    reveal: Vec<CollaboratorId>,
    expand_all: bool,
    depth: Option<usize>,
}

fn resolve_file(file: Option<PathBuf>, settings: &Settings) -> CliResult<PathBuf> {
    file.or_else(|| settings.data_file.clone()).ok_or_else(|| {
        CliError::Usage("no snapshot file given and no data_file configured".into())
    })
}

fn load_snapshot(c: &ServiceContainer, file: Option<PathBuf>) -> CliResult<OrgSnapshot> {
    let path = resolve_file(file, &c.settings)?;
    Ok(c.snapshots.load(&path)?)
}

fn emit(c: &ServiceContainer, text: &str, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            c.fs
                .write(path, text)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Written", &path.display());
        }
        None => output::info(text),
    }
    Ok(())
}

#[instrument(level = "debug", skip(c))]
fn cmd_layout(
    c: &ServiceContainer,
    file: Option<PathBuf>,
    request: LayoutRequest,
    format: Option<Format>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let mut snapshot = load_snapshot(c, file)?;

    let mut expanded = if request.expand_all || request.depth.is_some() {
        c.chart
            .initial_expansion(&snapshot.collaborators, request.expand_all, request.depth)
    } else if snapshot.expanded.is_empty() {
        c.chart.initial_expansion(
            &snapshot.collaborators,
            false,
            c.settings.chart.expand_depth,
        )
    } else {
        snapshot.expanded.clone()
    };
    expanded.extend(request.expand);
    for id in c
        .chart
        .reveal(&snapshot.collaborators, &mut expanded, &request.reveal)
    {
        output::warning(&format!("cannot reveal #{id}: not in snapshot"));
    }
    debug!("layout: {} expanded ids", expanded.len());
    snapshot.expanded = expanded;

    let chart = c.chart.layout(&snapshot);
    let text = format
        .unwrap_or(c.settings.chart.format)
        .encode(chart.as_ref())?;
    emit(c, &text, output.as_deref())
}

fn cmd_eligible(
    c: &ServiceContainer,
    file: Option<PathBuf>,
    node: CollaboratorId,
    sector: Option<SectorId>,
    level: Option<LevelId>,
    format: Option<Format>,
) -> CliResult<()> {
    let snapshot = load_snapshot(c, file)?;
    let graph = HierarchyGraph::new(&snapshot.collaborators);

    let (sector_id, level_id) = match graph.get(node) {
        Some(current) => (
            sector.unwrap_or(current.sector_id),
            level.unwrap_or(current.level_id),
        ),
        None if node == NEW_COLLABORATOR_ID => match (sector, level) {
            (Some(s), Some(l)) => (s, l),
            _ => {
                return Err(CliError::InvalidArgs(
                    "--sector and --level are required for a new collaborator".into(),
                ))
            }
        },
        None => {
            return Err(ApplicationError::from(DomainError::UnknownCollaborator(node)).into())
        }
    };

    let report = c
        .hierarchy
        .eligible(&snapshot.collaborators, node, sector_id, level_id);

    if let Some(format) = format {
        return emit(c, &format.encode(&report)?, None);
    }

    output::header(&format!(
        "Eligible superiors for #{} (sector {}, level {})",
        node,
        label_or_id(snapshot.sector_name(sector_id), sector_id),
        label_or_id(snapshot.level_name(level_id), level_id),
    ));
    if report.candidates.is_empty() {
        output::detail(&"(none)");
    }
    for candidate in &report.candidates {
        output::detail(&describe(&snapshot, candidate));
    }
    if let (Some(sup), Some(problem)) = (report.current_superior, &report.current_superior_problem)
    {
        output::warning(&format!("current superior #{sup} is no longer valid: {problem}"));
    }
    Ok(())
}

fn cmd_check(c: &ServiceContainer, file: Option<PathBuf>) -> CliResult<()> {
    let snapshot = load_snapshot(c, file)?;
    let issues = c.hierarchy.integrity(&snapshot.collaborators);
    if issues.is_empty() {
        output::success(&format!(
            "{} collaborators, no integrity issues",
            snapshot.collaborators.len()
        ));
        return Ok(());
    }
    output::header("Integrity issues");
    for issue in &issues {
        output::failure(issue);
    }
    Err(CliError::IntegrityIssues(issues.len()))
}

fn cmd_tree(c: &ServiceContainer, file: Option<PathBuf>, ids: bool) -> CliResult<()> {
    let snapshot = load_snapshot(c, file)?;
    let forest = build_forest(&snapshot.collaborators);
    let trees = forest.to_trees(|collab| {
        let level = label_or_id(snapshot.level_name(collab.level_id), collab.level_id);
        if ids {
            format!("#{} {} [{}]", collab.id, collab.display_name, level)
        } else {
            format!("{} [{}]", collab.display_name, level)
        }
    });
    for tree in trees {
        print!("{tree}");
    }
    Ok(())
}

fn cmd_descendants(c: &ServiceContainer, file: Option<PathBuf>, node: CollaboratorId) -> CliResult<()> {
    let snapshot = load_snapshot(c, file)?;
    let below = c.hierarchy.descendants(&snapshot.collaborators, node)?;
    output::header(&format!("{} below #{}", below.len(), node));
    for collab in below {
        output::detail(&describe(&snapshot, collab));
    }
    Ok(())
}

fn cmd_search(c: &ServiceContainer, file: Option<PathBuf>, query: &str) -> CliResult<()> {
    let snapshot = load_snapshot(c, file)?;
    let found = c.hierarchy.search(&snapshot.collaborators, query);
    if found.is_empty() {
        output::warning(&format!("no collaborator matches '{query}'"));
    }
    for collab in found {
        output::info(&describe(&snapshot, collab));
    }
    Ok(())
}

fn cmd_config(c: &ServiceContainer, command: ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&c.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let mark = |p: &Path| if p.exists() { "" } else { " (not found)" };
            match global_config_path() {
                Some(path) => output::action("Global", &format!("{}{}", path.display(), mark(&path))),
                None => output::action("Global", &"(no config directory)"),
            }
            let local = project_config_path(project_dir);
            output::action("Local", &format!("{}{}", local.display(), mark(&local)));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn label_or_id<T: std::fmt::Display>(name: Option<&str>, id: T) -> String {
    name.map_or_else(|| id.to_string(), str::to_string)
}

fn describe(snapshot: &OrgSnapshot, collab: &Collaborator) -> String {
    let level = label_or_id(snapshot.level_name(collab.level_id), collab.level_id);
    if collab.role.is_empty() {
        format!("#{} {} [{}]", collab.id, collab.display_name, level)
    } else {
        format!(
            "#{} {} - {} [{}]",
            collab.id, collab.display_name, collab.role, level
        )
    }
}
