//! CLI command implementations.
//!
//! Each invocation restores the saved session, performs one action and
//! persists the result, so a sequence of commands behaves like one session.

use crate::cli::output::{
    OutputFormat, format_copy, format_hint, format_levels, format_message, format_problem,
    format_rendered, format_view,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
#[cfg(feature = "system-clipboard")]
use crate::controller::SystemClipboard;
use crate::controller::{Clipboard, Controller, FileClipboard, MemoryClipboard};
use crate::error::{CommandError, IoError, Result};
use crate::extract::{Extractor, PageSnapshot};
use crate::hint::{ClueLevel, HintClient, HttpTransport};
use crate::render::render_markdown;
use crate::session::{SessionStore, SqliteKeyValueStore};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

type CliController<C> = Controller<HttpTransport, SqliteKeyValueStore, C>;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let config = cli.resolve_config()?;
    debug!(db_path = %config.db_path.display(), endpoint = %config.endpoint, "resolved config");

    match &cli.command {
        Commands::Detect { snapshot } => cmd_detect(&config, snapshot, format),
        Commands::Problem { text } => cmd_problem(&config, text.as_deref(), format),
        Commands::Hint {
            level,
            problem,
            plain,
        } => cmd_hint(&config, level.as_deref(), problem.as_deref(), *plain, format),
        Commands::Show { plain } => cmd_show(&config, *plain, format),
        Commands::Reset => cmd_reset(&config, format),
        Commands::Copy { to } => cmd_copy(&config, to.as_deref(), format),
        Commands::Render { file, plain } => cmd_render(file.as_deref(), *plain, format),
        Commands::Levels => Ok(format_levels(format)),
        Commands::Serve { listen, upstream } => {
            cmd_serve(&config, listen.as_deref(), upstream.as_deref())
        }
    }
}

/// Opens the session store and builds a restored controller.
fn open_controller<C: Clipboard>(config: &Config, clipboard: C) -> Result<CliController<C>> {
    let mut store = SqliteKeyValueStore::open(&config.db_path)?;
    store.init()?;

    let transport = HttpTransport::new(config.timeout())?;
    let mut controller = Controller::new(
        Extractor::with_default_adapters(),
        HintClient::new(transport, config.endpoint.clone()),
        SessionStore::new(store),
        clipboard,
    )
    .with_default_level(config.default_level);
    controller.restore()?;
    Ok(controller)
}

fn cmd_detect(config: &Config, snapshot: &Path, format: OutputFormat) -> Result<String> {
    let page = PageSnapshot::load(snapshot)?;
    let mut controller = open_controller(config, MemoryClipboard::new())?;
    let problem = controller.detect(&page)?;
    Ok(format_problem(problem, format))
}

fn cmd_problem(config: &Config, text: Option<&str>, format: OutputFormat) -> Result<String> {
    let text = match text {
        Some(t) => t.to_string(),
        None => read_stdin()?,
    };
    let mut controller = open_controller(config, MemoryClipboard::new())?;
    controller.set_problem(&text)?;
    Ok(format_problem(controller.problem(), format))
}

fn cmd_hint(
    config: &Config,
    level: Option<&str>,
    problem: Option<&str>,
    plain: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut controller = open_controller(config, MemoryClipboard::new())?;
    if let Some(problem) = problem {
        controller.set_problem(problem)?;
    }
    if let Some(level) = level {
        controller.set_level(ClueLevel::parse(level))?;
    }
    controller.request_hint()?;
    Ok(format_hint(&controller.view(), plain, format))
}

fn cmd_show(config: &Config, plain: bool, format: OutputFormat) -> Result<String> {
    let controller = open_controller(config, MemoryClipboard::new())?;
    Ok(format_view(&controller.view(), plain, format))
}

fn cmd_reset(config: &Config, format: OutputFormat) -> Result<String> {
    let mut controller = open_controller(config, MemoryClipboard::new())?;
    controller.reset()?;
    Ok(format_message("Session cleared.", format))
}

fn cmd_copy(config: &Config, to: Option<&Path>, format: OutputFormat) -> Result<String> {
    match to {
        Some(path) => copy_with(config, FileClipboard::new(path), format),
        None => copy_to_system(config, format),
    }
}

#[cfg(feature = "system-clipboard")]
fn copy_to_system(config: &Config, format: OutputFormat) -> Result<String> {
    copy_with(config, SystemClipboard::new()?, format)
}

#[cfg(not(feature = "system-clipboard"))]
fn copy_to_system(_config: &Config, _format: OutputFormat) -> Result<String> {
    Err(CommandError::FeatureDisabled(
        "system-clipboard (use --to FILE instead)".to_string(),
    )
    .into())
}

fn copy_with<C: Clipboard>(config: &Config, clipboard: C, format: OutputFormat) -> Result<String> {
    let mut controller = open_controller(config, clipboard)?;
    let feedback = controller.copy()?;
    Ok(format_copy(feedback, format))
}

fn cmd_render(file: Option<&Path>, plain: bool, format: OutputFormat) -> Result<String> {
    let input = match file {
        Some(path) => read_file(path)?,
        None => read_stdin()?,
    };
    Ok(format_rendered(&render_markdown(&input), plain, format))
}

#[cfg(feature = "proxy")]
fn cmd_serve(config: &Config, listen: Option<&str>, upstream: Option<&str>) -> Result<String> {
    let mut proxy = config.proxy.clone();
    if let Some(listen) = listen {
        proxy.listen = listen.to_string();
    }
    if let Some(upstream) = upstream {
        proxy.upstream = upstream.to_string();
    }
    crate::proxy::run(&proxy, config.timeout())
        .map_err(|e| CommandError::ExecutionFailed(format!("{e:#}")))?;
    Ok(String::new())
}

#[cfg(not(feature = "proxy"))]
fn cmd_serve(_config: &Config, _listen: Option<&str>, _upstream: Option<&str>) -> Result<String> {
    Err(CommandError::FeatureDisabled("proxy".to_string()).into())
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    std::fs::read_to_string(path).map_err(|e| {
        IoError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to read from stdin: {e}")))?;
    Ok(buffer)
}
