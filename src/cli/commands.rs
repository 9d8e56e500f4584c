//! Command dispatch

use std::io;

use clap::CommandFactory;
use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{SchemaBrowser, ViewOutcome};
use crate::application::{BrowserEvent, EventOutcome, EventQueue};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{SchemaFormat, TreeArena};
use crate::infrastructure::traits::{SelectionItem, Selector, SkimSelector};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    match command {
        Commands::Config { command } => return execute_config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "schema-inspector", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?)?;
    let mut browser = container.schema_browser()?;

    match command {
        Commands::Tree => cmd_tree(&mut browser),
        Commands::List => cmd_list(&browser),
        Commands::Select { schema } => cmd_select(&mut browser, schema),
        Commands::Toggle { node } => cmd_toggle(&mut browser, node),
        Commands::Format { format } => cmd_format(&mut browser, format.as_deref()),
        Commands::View { schema } => cmd_view(&mut browser, schema.as_deref()),
        Commands::Download { schema } => cmd_download(&mut browser, Some(schema)),
        Commands::DownloadAll => cmd_download(&mut browser, None),
        Commands::Browse => cmd_browse(&mut browser, &SkimSelector),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Settings with command line overrides applied.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load()?;
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(dir) = &cli.state_dir {
        settings.state_dir = dir.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(browser))]
fn cmd_tree(browser: &mut SchemaBrowser) -> CliResult<()> {
    browser.restore()?;
    let tree = browser.widget().tree();
    for &root in tree.roots() {
        if let Some(rendered) = render_node(tree, root) {
            output::info(&rendered);
        }
    }
    output::detail(&format!("format: {}", browser.selector().selected()));
    Ok(())
}

/// Collapsed nodes are rendered without their children.
fn render_node(tree: &TreeArena, idx: Index) -> Option<Tree<String>> {
    let node = tree.get_node(idx)?;
    let label = output::tree_label(
        &node.label,
        !node.children.is_empty(),
        node.expanded,
        node.active,
    );
    let mut rendered = Tree::new(label);
    if node.expanded {
        for &child in &node.children {
            if let Some(child_tree) = render_node(tree, child) {
                rendered.push(child_tree);
            }
        }
    }
    Some(rendered)
}

#[instrument(skip(browser))]
fn cmd_list(browser: &SchemaBrowser) -> CliResult<()> {
    for id in browser.list_schemas()? {
        output::info(&id);
    }
    Ok(())
}

#[instrument(skip(browser))]
fn cmd_select(browser: &mut SchemaBrowser, schema: &str) -> CliResult<()> {
    browser.restore()?;
    match browser.select_schema(schema)? {
        Some(outcome) => report_view(&outcome),
        None => output::warning(&format!("{schema} is not selectable")),
    }
    Ok(())
}

#[instrument(skip(browser))]
fn cmd_toggle(browser: &mut SchemaBrowser, node: &str) -> CliResult<()> {
    browser.restore()?;
    let outcome = browser.handle(BrowserEvent::Toggle(node.to_string()))?;
    report_event(&outcome);
    Ok(())
}

#[instrument(skip(browser))]
fn cmd_format(browser: &mut SchemaBrowser, format: Option<&str>) -> CliResult<()> {
    browser.restore()?;
    let Some(requested) = format else {
        let selected = browser.selector().selected_index();
        for (i, f) in browser.selector().options().iter().enumerate() {
            let marker = if i == selected { "*" } else { " " };
            output::info(&format!("{marker} {i}: {f}"));
        }
        return Ok(());
    };

    let idx = resolve_format_index(browser, requested)?;
    let outcome = browser.handle(BrowserEvent::FormatChanged(idx))?;
    output::action("Format", browser.selector().selected());
    report_event(&outcome);
    Ok(())
}

/// Accept a position in the format list or a format name.
fn resolve_format_index(browser: &SchemaBrowser, requested: &str) -> CliResult<usize> {
    if let Ok(idx) = requested.parse::<usize>() {
        return Ok(idx);
    }
    let format: SchemaFormat = requested
        .parse()
        .map_err(|e: crate::domain::DomainError| CliError::InvalidArgs(e.to_string()))?;
    browser.selector().position(&format).ok_or_else(|| {
        let names: Vec<_> = browser
            .selector()
            .options()
            .iter()
            .map(|f| f.to_string())
            .collect();
        CliError::InvalidArgs(format!(
            "format {format} is not configured (have: {})",
            names.join(", ")
        ))
    })
}

#[instrument(skip(browser))]
fn cmd_view(browser: &mut SchemaBrowser, schema: Option<&str>) -> CliResult<()> {
    browser.restore()?;
    let schema = match schema {
        Some(s) => s.to_string(),
        None => browser
            .active_schema()
            .ok_or_else(|| CliError::Usage("no active schema; pass a schema name".into()))?,
    };
    let outcome = browser.view_schema(&schema)?;
    report_view(&outcome);
    Ok(())
}

#[instrument(skip(browser))]
fn cmd_download(browser: &mut SchemaBrowser, schema: Option<&str>) -> CliResult<()> {
    browser.load_format_preference();
    let event = match schema {
        Some(s) => BrowserEvent::Download(s.to_string()),
        None => BrowserEvent::DownloadAll,
    };
    let outcome = browser.handle(event)?;
    report_event(&outcome);
    Ok(())
}

/// Interactive loop: every pick is queued as a selection.
fn cmd_browse(browser: &mut SchemaBrowser, selector: &dyn Selector) -> CliResult<()> {
    browser.restore()?;
    let mut queue = EventQueue::new();

    loop {
        let active = browser.active_schema();
        let items: Vec<SelectionItem> = browser
            .schema_ids()
            .iter()
            .map(|id| SelectionItem {
                display: if active.as_deref() == Some(id.as_str()) {
                    format!("{id} *")
                } else {
                    id.clone()
                },
                value: id.clone(),
            })
            .collect();
        if items.is_empty() {
            output::warning(&"server has no schemas");
            return Ok(());
        }

        let prompt = format!("schema ({})> ", browser.selector().selected());
        let picked = selector
            .select_one(&items, &prompt)
            .map_err(|message| InfraError::Selector { message })?;
        let Some(item) = picked else {
            return Ok(());
        };

        queue.push(BrowserEvent::SelectSchema(item.value));
        let run = queue.run(browser);
        for outcome in &run.outcomes {
            report_event(outcome);
        }
        if let Some(e) = run.error {
            return Err(e.into());
        }
    }
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("Global", &format!("{}{}", path.display(), state));
                }
                None => output::warning(&"no config directory on this platform"),
            }
            let settings = load_settings(cli)?;
            output::action("State", &settings.state_file().display());
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("no config directory on this platform".into()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists (use --force to overwrite)",
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
        }
    }
    Ok(())
}

fn report_view(outcome: &ViewOutcome) {
    match outcome {
        ViewOutcome::SpecViewerLoaded {
            schema_id,
            document,
        } => output::action("Viewer", &format!("{schema_id} -> {}", document.display())),
        ViewOutcome::SpecViewerUpdated {
            schema_id,
            document,
        } => output::action(
            "Viewer",
            &format!("{schema_id} updated in {}", document.display()),
        ),
        ViewOutcome::FrameNavigated { schema_id, url } => {
            output::action("Opened", &format!("{schema_id} -> {url}"))
        }
        ViewOutcome::Skipped { schema_id, format } => output::detail(&format!(
            "{schema_id}: {format} has no viewer, use `download {schema_id}`"
        )),
    }
}

fn report_event(outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Viewed(view) => report_view(view),
        EventOutcome::Toggled { id, expanded } => {
            let state = if *expanded { "expanded" } else { "collapsed" };
            output::action(state, id.as_deref().unwrap_or("<anonymous>"));
        }
        EventOutcome::Downloaded(path) => output::success(&format!("saved {}", path.display())),
        EventOutcome::Nothing => {}
    }
}
