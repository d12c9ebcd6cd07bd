//! Dry-run driver for a view shell site.
//!
//! # Responsibility
//! - Boot a site's shell page against its local fragment directory.
//! - Replay a list of view navigations and report the resulting state.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use futures::executor::block_on;
use log::info;
use std::path::PathBuf;
use viewshell_core::{
    default_log_level, init_logging, DirectoryHost, Document, LogTarget, NavigationOutcome,
    Shell, ShellConfig, ShellHost, WidgetRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "viewshell")]
#[command(about = "Boot a view shell site and replay navigations", long_about = None)]
struct Args {
    /// Site directory holding the shell page and its view fragments
    #[arg(value_name = "SITE_DIR")]
    site_dir: PathBuf,

    /// Shell page, relative to the site directory
    #[arg(long, default_value = "index.html")]
    shell: String,

    /// JSON shell configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// trace|debug|info|warn|error (default depends on build mode)
    #[arg(long)]
    log_level: Option<String>,

    /// Views to load in order after boot, e.g. views/about.html
    #[arg(value_name = "VIEW")]
    views: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, LogTarget::Stderr).map_err(|err| anyhow!(err))?;

    let config = match &args.config {
        Some(path) => ShellConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ShellConfig::default(),
    };
    let host = DirectoryHost::new(&args.site_dir, &args.shell)
        .with_context(|| format!("failed to open site {}", args.site_dir.display()))?;
    let source = host
        .read_shell()
        .with_context(|| format!("failed to read {}", host.shell_path().display()))?;
    let document = Document::parse_html(&source);

    let mut shell = Shell::new(config, host, document, WidgetRegistry::with_defaults(None));
    info!(
        "event=cli_start module=cli status=ok site={} views={}",
        args.site_dir.display(),
        args.views.len()
    );

    let mut outcomes: Vec<NavigationOutcome> = Vec::new();
    block_on(async {
        outcomes.extend(shell.boot().await);
        for view in &args.views {
            outcomes.push(shell.load_view(view).await);
        }
    });
    shell.run_due_timers();

    for outcome in &outcomes {
        println!("navigation: {outcome}");
    }
    let mount = shell
        .mount()
        .map(|mount| shell.document().inner_html(mount))
        .unwrap_or_default();
    println!("address: {}", shell.host().location_href());
    println!("history: {}", shell.host().history_len());
    println!("view:\n{mount}");

    if outcomes.iter().any(|outcome| !outcome.is_completed()) {
        std::process::exit(2);
    }
    Ok(())
}
