//! CLI binary for repodoc: documentation snapshots, relationship context,
//! and edit impact analysis for a repository.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use repodoc_context::handler::DocHandler;
use repodoc_context::repo::find_repo_root;
use repodoc_core::config::DocConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "repodoc", about = "Repository documentation and edit impact analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate (or serve from cache) the repository documentation for a file
    Doc {
        /// File whose repository should be documented
        file: PathBuf,

        /// Emit the full response as JSON instead of rendered text
        #[arg(long)]
        json: bool,
    },

    /// Analyze the impact of a proposed edit to a file
    Impact {
        /// File the edit applies to
        file: PathBuf,

        /// Edit snippet given inline
        #[arg(long, conflicts_with = "edit_file")]
        edit: Option<String>,

        /// Read the edit snippet from a file
        #[arg(long)]
        edit_file: Option<PathBuf>,
    },

    /// Print one chunk of the cached documentation
    Chunk {
        /// Repository root (or any path inside it)
        repo: PathBuf,

        /// Zero-based chunk index
        index: usize,
    },

    /// Invalidate the cache and rebuild documentation for a repository
    Refresh {
        /// Repository root (or any path inside it)
        repo: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Doc { file, json } => cmd_doc(&file, json),
        Commands::Impact {
            file,
            edit,
            edit_file,
        } => cmd_impact(&file, edit, edit_file),
        Commands::Chunk { repo, index } => cmd_chunk(&repo, index),
        Commands::Refresh { repo } => cmd_refresh(&repo),
    }
}

fn handler_for(path: &Path) -> Result<(DocHandler, PathBuf)> {
    let root = find_repo_root(path)
        .with_context(|| format!("no repository found containing {}", path.display()))?;
    tracing::debug!("resolved repository root {}", root.display());
    let config = DocConfig::load(&root)?;
    Ok((DocHandler::new(config), root))
}

fn cmd_doc(file: &Path, json: bool) -> Result<()> {
    let (mut handler, _root) = handler_for(file)?;
    let response = handler.request_documentation(file, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.documentation.render());
    if let Some(context) = &response.context {
        println!();
        println!("Direct relationships:");
        if !context.imports.is_empty() {
            println!("  Imports: {}", context.imports.join(", "));
        }
        if !context.functions.is_empty() {
            let names: Vec<&str> = context.functions.keys().map(String::as_str).collect();
            println!("  Functions: {}", names.join(", "));
        }
        if !context.related_files.is_empty() {
            let related: Vec<&str> = context.related_files.iter().map(String::as_str).collect();
            println!("  Related files: {}", related.join(", "));
        }
    }
    Ok(())
}

fn cmd_impact(file: &Path, edit: Option<String>, edit_file: Option<PathBuf>) -> Result<()> {
    let snippet = match (edit, edit_file) {
        (Some(snippet), None) => snippet,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read edit file {}", path.display()))?,
        _ => bail!("provide the edit with --edit or --edit-file"),
    };

    let (mut handler, _root) = handler_for(file)?;
    let response = handler.request_documentation(file, Some(&snippet))?;
    let impact = response
        .impact
        .context("no impact report produced for the edit")?;

    println!("{}", serde_json::to_string_pretty(&impact)?);
    Ok(())
}

fn cmd_chunk(repo: &Path, index: usize) -> Result<()> {
    let (mut handler, root) = handler_for(repo)?;
    match handler.get_chunk(&root, index) {
        Some(chunk) => {
            println!("{chunk}");
            Ok(())
        }
        None => bail!(
            "no cached chunk {} for {}; run `repodoc doc` first",
            index,
            root.display()
        ),
    }
}

fn cmd_refresh(repo: &Path) -> Result<()> {
    let (mut handler, root) = handler_for(repo)?;
    let bundle = handler.refresh(&root)?;
    println!(
        "Refreshed documentation for {} ({} bytes)",
        root.display(),
        bundle.render().len()
    );
    Ok(())
}
