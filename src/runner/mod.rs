//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the manifest, runs the configuration pass, and renders or acts on the
//! resulting layout.

mod error;
mod path_helpers;

pub use error::RunnerError;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::ir::{BuildLayout, PassOptions};
use crate::{layout_gen, manifest};
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::{self, Write};
use tracing::{debug, info};

use path_helpers::{
    ensure_manifest_exists, manifest_base_dir, resolve_manifest_path, resolve_relocation,
    working_dir,
};

/// Execute the parsed [`Cli`] command, writing results to standard output.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the configuration pass
/// fails, or the command itself fails.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, &mut out)
}

/// Execute the parsed [`Cli`] command, writing results to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Resolve {
        format: OutputFormat::Text,
    });
    let layout = resolve_layout(cli)?;
    let rendered = match command {
        Commands::Resolve {
            format: OutputFormat::Text,
        } => layout_gen::text(&layout),
        Commands::Resolve {
            format: OutputFormat::Json,
        } => layout_gen::json(&layout).context("serialising build layout")?,
        Commands::Order => layout_gen::order(&layout),
        Commands::Graph => layout_gen::dot(&layout),
        Commands::Clean { dry_run } => clean(&layout, dry_run)?,
    };
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .context("writing output")
}

/// Load the manifest referenced by `cli` and run the configuration pass.
///
/// # Errors
///
/// Returns an error if the manifest is missing or invalid, or if the
/// configuration pass rejects it.
pub fn resolve_layout(cli: &Cli) -> Result<BuildLayout> {
    let working_dir = working_dir(cli)?;
    let manifest_path = resolve_manifest_path(cli, &working_dir)?;
    ensure_manifest_exists(&manifest_path)?;
    let manifest = manifest::from_path(&manifest_path)
        .with_context(|| format!("loading manifest at {manifest_path}"))?;
    debug!(path = %manifest_path, "loaded manifest");

    let mut options = PassOptions::new(manifest_base_dir(&manifest_path));
    if let Some(relocate) = resolve_relocation(cli.relocate.as_ref(), &working_dir)? {
        debug!(relocate = %relocate, "root relocation overridden on the command line");
        options = options.with_relocate(relocate);
    }
    BuildLayout::from_manifest(&manifest, &options)
        .with_context(|| format!("resolving build layout for {manifest_path}"))
}

/// Remove the root build directory, returning the report to print.
fn clean(layout: &BuildLayout, dry_run: bool) -> Result<String, RunnerError> {
    let path = layout.root_build_dir();
    ensure_safe_to_clean(path, layout.projects().map(|p| p.project_dir.as_path()))?;
    if dry_run {
        return Ok(format!("would remove {path}\n"));
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            info!(path = %path, "removed build directory");
            Ok(format!("removed {path}\n"))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path, "build directory already absent");
            Ok(format!("nothing to remove at {path}\n"))
        }
        Err(source) => Err(RunnerError::Clean {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Refuse when any project directory lies at or below `path`.
fn ensure_safe_to_clean<'a>(
    path: &Utf8Path,
    project_dirs: impl IntoIterator<Item = &'a Utf8Path>,
) -> Result<(), RunnerError> {
    project_dirs
        .into_iter()
        .find(|dir| dir.starts_with(path))
        .map_or(Ok(()), |project_dir| {
            Err(RunnerError::UnsafeClean {
                path: path.to_path_buf(),
                project_dir: project_dir.to_path_buf(),
            })
        })
}
