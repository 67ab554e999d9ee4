//! Command dispatch: one handler per subcommand.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, Editor};
use crate::cli::args::{Cli, Commands, ConfigCommands, ModeArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{EditError, KindRecord, Locator, MoveMode, NodeId};
use crate::infrastructure::{InfraError, ServiceContainer};
use crate::tree_traits::{visible_tree, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    let project_dir = project_dir(&cli.file);

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "btb", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(command, &project_dir),
        _ => {
            let settings = Settings::load(Some(project_dir.as_path()))?;
            let container = ServiceContainer::new(settings);
            execute_document_command(&container, command, &cli.file)
        }
    }
}

fn execute_document_command(
    container: &ServiceContainer,
    command: &Commands,
    file: &Path,
) -> CliResult<()> {
    match command {
        Commands::New { force } => cmd_new(container, file, *force),
        Commands::Kinds => cmd_kinds(container, file),
        Commands::Scan { paths, dry_run } => cmd_scan(container, file, paths, *dry_run),
        Commands::Import { kind_file } => cmd_import(container, file, kind_file),
        Commands::Add { kind, at, mode } => cmd_add(container, file, kind, *at, *mode),
        Commands::Move {
            source,
            target,
            mode,
        } => cmd_move(container, file, *source, *target, (*mode).into()),
        Commands::Remove { id } => cmd_remove(container, file, *id),
        Commands::Toggle { id } => cmd_toggle(container, file, *id),
        Commands::Code => cmd_code(container, file),
        Commands::Layout => cmd_layout(container, file),
        Commands::Tree { all } => cmd_tree(container, file, *all),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not operate on a document".to_string(),
        )),
    }
}

/// Directory holding the document; local config lives there.
fn project_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Open the document, apply `edit`, and save on success.
fn edit_document<T>(
    container: &ServiceContainer,
    file: &Path,
    edit: impl FnOnce(&mut Editor) -> Result<T, ApplicationError>,
) -> CliResult<T> {
    let service = container.project_service();
    let mut editor = service.open(file)?;
    let result = edit(&mut editor)?;
    service.save(file, &editor)?;
    Ok(result)
}

#[instrument(level = "debug", skip(container))]
fn cmd_new(container: &ServiceContainer, file: &Path, force: bool) -> CliResult<()> {
    let editor = container.project_service().create(file, force)?;
    output::success(&format!("created {}", file.display()));
    let custom = editor.catalog().custom_kinds().len();
    if custom > 0 {
        output::detail(&format!("{} custom kinds from config", custom));
    }
    Ok(())
}

fn cmd_kinds(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let editor = container.project_service().open(file)?;
    output::header("Kinds");
    for kind in editor.catalog().list_kinds() {
        output::detail(&format!(
            "{:<20} {:<10} max={:<4} {}",
            kind.name, kind.class, kind.max_children, kind.description
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_scan(
    container: &ServiceContainer,
    file: &Path,
    paths: &[PathBuf],
    dry_run: bool,
) -> CliResult<()> {
    let scanner = container.scan_service()?;
    let mut records: Vec<KindRecord> = Vec::new();
    for path in paths {
        let report = scanner.scan_path(path)?;
        debug!(
            "scan {}: {} files, {} kinds",
            path.display(),
            report.files.len(),
            report.kinds.len()
        );
        for record in report.kinds {
            if !records.iter().any(|r| r.name == record.name) {
                records.push(record);
            }
        }
    }

    if records.is_empty() {
        output::warning("no kinds with a Tick function found");
        return Ok(());
    }

    if dry_run {
        output::header("Would register");
        for record in &records {
            output::added(&record.name);
        }
        return Ok(());
    }

    let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
    let added = edit_document(container, file, |editor| {
        Ok(editor.register_kinds(records)?)
    })?;
    output::action("Registered", &format!("{} new of {} found", added, names.len()));
    for name in names {
        output::added(&name);
    }
    Ok(())
}

fn cmd_import(container: &ServiceContainer, file: &Path, kind_file: &Path) -> CliResult<()> {
    let service = container.project_service();
    let added = edit_document(container, file, |editor| {
        service.import_kinds(editor, kind_file)
    })?;
    output::action("Imported", &format!("{} new kinds from {}", added, kind_file.display()));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_add(
    container: &ServiceContainer,
    file: &Path,
    kind: &str,
    at: Option<NodeId>,
    mode: ModeArg,
) -> CliResult<()> {
    let id = edit_document(container, file, |editor| match at {
        Some(target) => editor.add_node_at(kind, target, mode.into()),
        None => Ok(editor.add_node(kind)?),
    })?;
    output::action("Added", &format!("{} {}", kind, id));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_move(
    container: &ServiceContainer,
    file: &Path,
    source: NodeId,
    target: NodeId,
    mode: MoveMode,
) -> CliResult<()> {
    edit_document(container, file, |editor| {
        Ok(editor.move_node(source, target, mode)?)
    })?;
    output::action("Moved", &format!("{} as {} of {}", source, mode, target));
    Ok(())
}

fn cmd_remove(container: &ServiceContainer, file: &Path, id: NodeId) -> CliResult<()> {
    let removed = edit_document(container, file, |editor| Ok(editor.remove_node(id)?))?;
    output::action(
        "Removed",
        &format!("{} {} ({} nodes)", removed.name(), id, removed.subtree_ids().len()),
    );
    Ok(())
}

fn cmd_toggle(container: &ServiceContainer, file: &Path, id: NodeId) -> CliResult<()> {
    let expanded = edit_document(container, file, |editor| {
        editor
            .toggle_expand(id)
            .ok_or(ApplicationError::Edit(EditError::NotFound(Locator::Id(id))))
    })?;
    let state = if expanded { "expanded" } else { "collapsed" };
    output::action("Toggled", &format!("{} {}", id, state));
    Ok(())
}

fn cmd_code(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let mut editor = container.project_service().open(file)?;
    output::info(editor.code());
    Ok(())
}

fn cmd_layout(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let editor = container.project_service().open(file)?;
    let layout = editor.compute_layout();
    for (id, placed) in &layout.nodes {
        let name = editor.forest().get(*id).map_or("?", |n| n.name());
        let marker = match (placed.has_children, placed.expanded) {
            (false, _) => "",
            (true, true) => " [-]",
            (true, false) => " [+]",
        };
        output::info(&format!(
            "{:<6} {:<20} x={:<8} y={:<8} w={:<6} h={}{}",
            id.to_string(),
            name,
            placed.rect.x,
            placed.rect.y,
            placed.rect.width,
            placed.rect.height,
            marker
        ));
    }
    for c in &layout.connectors {
        output::detail(&format!(
            "{} -> {}: ({}, {}) - ({}, {})",
            c.parent, c.child, c.x1, c.y1, c.x2, c.y2
        ));
    }
    output::header(&format!(
        "canvas {} x {}",
        layout.total_width, layout.total_height
    ));
    Ok(())
}

fn cmd_tree(container: &ServiceContainer, file: &Path, all: bool) -> CliResult<()> {
    let editor = container.project_service().open(file)?;
    if all {
        output::info(&editor.forest().to_tree_string());
        return Ok(());
    }
    if editor.forest().is_empty() {
        output::info("(empty)");
    }
    for root in editor.forest().roots() {
        output::info(&visible_tree(root, editor.expanded()));
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let describe = |path: &Path| {
                let state = if path.exists() { "exists" } else { "not found" };
                format!("{} ({})", path.display(), state)
            };
            match global_config_path() {
                Some(path) => output::action("Global", &describe(&path)),
                None => output::action("Global", "unavailable (no home directory)"),
            }
            output::action("Local", &describe(&local_config_path(project_dir)));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(project_dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
    }
}
