//! Command-line entry points.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;

use crate::app::dialog::{DialogOptions, RemoveIedsDialog};
use crate::app::host::EditorHost;
use crate::app::projection::project_items;
use crate::domain::model::ListItem;
use crate::infra::config::Config;
use crate::infra::logging::{self, LogTarget};
use crate::infra::scl::{self, WriteOptions};
use crate::ui::app::UiApp;

#[derive(Debug, Parser)]
#[command(
    name = "remove-ieds",
    author,
    version,
    about = "Browse the IEDs of an SCL file and remove a selected subset",
    long_about = None
)]
pub struct Cli {
    /// Extra configuration file layered over user and workspace config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open an SCL file in the interactive editor
    Open {
        file: PathBuf,
        /// Save to this path instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the IEDs of an SCL file the way the removal dialog lists them
    List {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Remove IEDs and their references without the interactive editor
    Remove {
        file: PathBuf,
        /// Name of an IED to remove, covering every IED of that name; repeat for several
        #[arg(long = "ied", value_name = "NAME", required = true)]
        ieds: Vec<String>,
        /// Write to this path instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Report what would be removed without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "remove-ieds", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let level = match cli.verbose {
        0 => logging::parse_level(config.logging.level()),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let target = match cli.command {
        Commands::Open { .. } => LogTarget::for_tui(&config.logging),
        _ => LogTarget::for_cli(&config.logging),
    };
    logging::init(level, &target)?;

    match cli.command {
        Commands::Open { file, output } => open(config, file, output),
        Commands::List { file, json } => list(file, json),
        Commands::Remove {
            file,
            ieds,
            output,
            dry_run,
        } => remove(&config, file, &ieds, output, dry_run),
        Commands::Completions { .. } => Ok(()),
    }
}

fn open(config: Config, file: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut host = EditorHost::new();
    host.open(&file)?;
    let mut app = UiApp::new(config, host, output)?;
    app.run()
}

fn list(file: PathBuf, json: bool) -> Result<()> {
    let document = scl::read_document(&file)?;
    let items = project_items(Some(&document));
    if json {
        let rendered =
            serde_json::to_string_pretty(&items).context("failed to serialize IED list")?;
        println!("{rendered}");
    } else {
        print!("{}", render_listing(&items));
    }
    Ok(())
}

fn remove(
    config: &Config,
    file: PathBuf,
    names: &[String],
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let mut host = EditorHost::new();
    host.open(&file)?;

    let mut dialog = RemoveIedsDialog::new(DialogOptions::from_config(config));
    dialog.run(&host);

    let mut missing = Vec::new();
    for name in names {
        if dialog.list_mut().set_checked_named(name, true) == 0 {
            missing.push(name.as_str());
        }
    }
    if !missing.is_empty() {
        dialog.cancel();
        anyhow::bail!(
            "no IED named {} in {}",
            missing.join(", "),
            file.display()
        );
    }

    let report = dialog.submit(&mut host);
    dialog.close();

    let verb = if dry_run { "would remove" } else { "removed" };
    for name in &report.removed {
        println!("{verb} {name}");
    }
    for name in &report.skipped {
        eprintln!("skipped {name}");
    }

    if dry_run || report.removed.is_empty() {
        return Ok(());
    }

    let options = WriteOptions::from_config(config);
    let written = host.save(output.as_deref(), &options)?;
    println!("wrote {}", written.display());
    Ok(())
}

/// Plain-text listing: headline, then the indented supporting text when there is one.
pub fn render_listing(items: &[ListItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&item.headline);
        out.push('\n');
        if !item.supporting_text.is_empty() {
            out.push_str("    ");
            out.push_str(&item.supporting_text);
            out.push('\n');
        }
    }
    out
}
