use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};
use colored::Colorize;

use crate::layout::{DashboardLayout, Viewport};
use crate::percent::compute_label_str;
use crate::reorder::Side;
use crate::sources::StatisticsSource;
use crate::statistics::Period;
use crate::summary::panel_title;

pub const DEFAULT_LAYOUT_PATH: &str = "data/layout.json";
pub const DEFAULT_CSV_PATH: &str = "data/output/statistics.csv";
pub const DEFAULT_HTML_PATH: &str = "data/output/dashboard.html";

pub const API_URL_HELP: &str = "Base URL of the Zipkart backend; statistics are read from {url}/statistics.";
pub const STATS_FILE_HELP: &str = "Read statistics from a JSON file instead of the backend (takes precedence over --api-url).";
pub const SAVE_CSV_HELP: &str = "Save the period comparison table to the given CSV file (defaults to data/output/statistics.csv when no path is provided). Use --archive-csv to store a .gz instead.";
pub const SAVE_HTML_HELP: &str = "Save the HTML dashboard to the given file (defaults to data/output/dashboard.html when no path is provided).";
pub const ARCHIVE_CSV_HELP: &str = "Archive the saved CSV into a .gz file.";
pub const LAYOUT_HELP: &str = "Panel layout file, created on first reorder.";

#[derive(Debug, Parser)]
#[command(
    name = "zipkart-dash",
    about = "Render the Zipkart statistics dashboard and manage its panel layout.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(long, value_name = "URL", env = "ZIPKART_API_URL", help = API_URL_HELP)]
    pub api_url: Option<String>,
    #[arg(
        long,
        value_name = "TOKEN",
        env = "ZIPKART_TOKEN",
        hide_env_values = true,
        help = "Session token sent as a bearer token."
    )]
    pub token: Option<String>,
    #[arg(long, value_name = "FILE", help = STATS_FILE_HELP)]
    pub stats_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Period::Month)]
    pub period: Period,
    #[arg(
        long,
        value_name = "FILE",
        default_value = DEFAULT_LAYOUT_PATH,
        global = true,
        help = LAYOUT_HELP
    )]
    pub layout: PathBuf,
    #[arg(long, value_enum, default_value_t = Viewport::Desktop, global = true)]
    pub viewport: Viewport,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CSV_PATH,
        help = SAVE_CSV_HELP
    )]
    pub save_csv: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
    #[arg(long, help = ARCHIVE_CSV_HELP)]
    pub archive_csv: bool,
    #[arg(long, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[arg(short, long, global = true, help = "Show debug logs on stderr.")]
    pub verbose: bool,
    #[arg(short, long, global = true, help = "Only log errors.")]
    pub quiet: bool,
    #[arg(long, global = true, help = "Disable coloured output.")]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Statistics source selected on the command line.
    pub fn statistics_source(&self) -> Result<StatisticsSource> {
        if let Some(path) = &self.stats_file {
            return Ok(StatisticsSource::File(path.clone()));
        }
        let base_url = self.api_url.clone().ok_or_else(|| {
            anyhow!("no statistics source; pass --api-url (or set ZIPKART_API_URL) or --stats-file")
        })?;
        Ok(StatisticsSource::Api {
            base_url,
            token: self.token.clone(),
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the change label for a current and a previous value.
    Label {
        #[arg(allow_hyphen_values = true)]
        current: String,
        #[arg(allow_hyphen_values = true)]
        previous: String,
    },
    /// Move a panel within one list of the stored layout.
    Reorder {
        #[arg(long, value_enum)]
        side: Side,
        #[arg(long)]
        key: String,
        #[arg(long = "to", value_name = "INDEX")]
        to_index: usize,
    },
    /// Show the stored panel layout.
    Layout {
        #[arg(long, help = "Restore the default panel order.")]
        reset: bool,
    },
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

pub async fn handle_command(
    command: Commands,
    layout_path: &Path,
    viewport: Viewport,
) -> Result<()> {
    match command {
        Commands::Label { current, previous } => {
            println!("{}", compute_label_str(&current, &previous));
            Ok(())
        }
        Commands::Reorder {
            side,
            key,
            to_index,
        } => reorder_panel(layout_path, side, &key, to_index).await,
        Commands::Layout { reset } => show_layout(layout_path, viewport, reset).await,
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
    }
}

async fn reorder_panel(layout_path: &Path, side: Side, key: &str, to_index: usize) -> Result<()> {
    let mut layout = DashboardLayout::load(layout_path).await?;
    if !layout.sequence(side).iter().any(|existing| existing == key) {
        println!(
            "{} {}",
            format!("No panel `{key}` in the {side} list;").bright_yellow(),
            "layout unchanged.".bright_black()
        );
        println!("{}", sequence_line(side, layout.sequence(side)));
        return Ok(());
    }

    layout.move_panel(side, key, to_index);
    layout.save(layout_path).await?;
    println!("{}", sequence_line(side, layout.sequence(side)));
    Ok(())
}

async fn show_layout(layout_path: &Path, viewport: Viewport, reset: bool) -> Result<()> {
    let layout = if reset {
        let layout = DashboardLayout::default();
        layout.save(layout_path).await?;
        layout
    } else {
        DashboardLayout::load(layout_path).await?
    };
    for (side, keys) in layout.columns(viewport) {
        println!("{}", sequence_line(side, keys));
    }
    Ok(())
}

/// `  left: 0:sales (Sales Overview), 1:...` for one list.
fn sequence_line(side: Side, keys: &[String]) -> String {
    let entries: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(idx, key)| format!("{idx}:{key} ({})", panel_title(key)))
        .collect();
    format!(
        "{} {}",
        format!("{side:>6}:").bright_yellow().bold(),
        entries.join(", ").bright_white()
    )
}

fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let target_dir = match (output_dir, install) {
        (Some(dir), _) => dir,
        (None, true) => completion_install_dir(shell, std::env::var_os("HOME"))?,
        (None, false) => {
            let mut command = Cli::command();
            let bin_name = command.get_name().to_string();
            let mut stdout = io::stdout().lock();
            generate(shell, &mut command, bin_name, &mut stdout);
            return stdout.flush().context("failed to flush completion output");
        }
    };

    let path = write_completions(shell, &target_dir)?;
    println!("Installed {shell} completions to {}", path.display());
    Ok(())
}

/// Writes the completion script for `shell` into `dir`, returning its path.
fn write_completions(shell: Shell, dir: &Path) -> Result<PathBuf> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
    generate_to(shell, &mut command, bin_name, dir).context("failed to write completion file")
}

/// Per-user completion directory for `shell` under `home`.
fn completion_install_dir(shell: Shell, home: Option<OsString>) -> Result<PathBuf> {
    let relative = match shell {
        Shell::Bash => ".local/share/bash-completion/completions",
        Shell::Elvish => ".elvish/lib/completions",
        Shell::Fish => ".config/fish/completions",
        Shell::PowerShell => ".local/share/powershell/Scripts",
        Shell::Zsh => ".local/share/zsh/site-functions",
        other => bail!("no default install location for {other}; pass --output-dir"),
    };
    let home = home.ok_or_else(|| anyhow!("HOME is not set; pass --output-dir"))?;
    Ok(PathBuf::from(home).join(relative))
}
