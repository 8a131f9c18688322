use std::fmt::Display;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{ArgAction, Args, ColorChoice, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::{Generator, Shell, generate};
use clap_complete_nushell::Nushell;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::{info, warn};

use commit_lanes::config::Config;
use commit_lanes::context::LogSnapshot;
use commit_lanes::git::{self, HistoryOptions};
use commit_lanes::render::TextRenderer;
use commit_lanes::store::{GraphStore, LogStatus};
use commit_lanes::{AppError, AppResult};

use crate::io_utils::{write_json_output, write_text_output};

const STYLES: Styles = Styles::styled()
    .header(Style::new().bold())
    .usage(Style::new().bold())
    .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .literal(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Green))),
    )
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
    .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
    .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed))))
    .context(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
    .context_value(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
    );

/// Long-form CLI description shown in `--help`.
const LONG_ABOUT: &str = "Commit Lanes - Draw a repository's history as a lane graph

Every commit gets a row and a lane. Lanes fork off where branches split and
merge back where they rejoin, and freed lanes are reused so the graph stays
as narrow as the number of branches open at once.

Log verbosity can also be set with the COMMIT_LANES_LOG environment variable,
and defaults are read from config.json in the config directory.";

/// Commit Lanes - Draw a repository's history as a lane graph.
#[derive(Parser, Debug, Clone)]
#[command(author, version, propagate_version = true, about, long_about = Some(LONG_ABOUT), styles = STYLES)]
pub struct Cli {
    /// Color choice for the output
    #[arg(long, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Subcommand to run
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Output format for the laid-out history.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per commit with the lanes drawn in ASCII
    Text,

    /// The rows with their lanes, lane sets and colors as JSON
    Json,
}

/// Top-level commands supported by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Lay out the commit history of a repository
    Log {
        #[command(flatten)]
        log: LogArgs,
        #[command(flatten)]
        verbosity: Verbosity<WarnLevel>,
    },

    /// Generate shell completion for a given shell
    Completion {
        /// Output file to write the completion script to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The shell to generate the completion for
        #[arg(value_enum)]
        shell: CompletionShell,

        #[command(flatten)]
        verbosity: Verbosity<WarnLevel>,
    },
}

/// Supported completion targets for shell auto-completion.
#[derive(ValueEnum, Clone, Debug)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
    Nushell,
}

impl Display for CompletionShell {
    /// Render the canonical shell name string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompletionShell::Bash => "bash",
            CompletionShell::Zsh => "zsh",
            CompletionShell::Fish => "fish",
            CompletionShell::PowerShell => "powershell",
            CompletionShell::Elvish => "elvish",
            CompletionShell::Nushell => "nushell",
        };
        write!(f, "{}", s)
    }
}

impl Generator for &CompletionShell {
    fn generate(&self, cmd: &clap::builder::Command, buf: &mut dyn Write) {
        match self {
            CompletionShell::Bash => Shell::Bash.generate(cmd, buf),
            CompletionShell::Zsh => Shell::Zsh.generate(cmd, buf),
            CompletionShell::Fish => Shell::Fish.generate(cmd, buf),
            CompletionShell::PowerShell => Shell::PowerShell.generate(cmd, buf),
            CompletionShell::Elvish => Shell::Elvish.generate(cmd, buf),
            CompletionShell::Nushell => Nushell.generate(cmd, buf),
        }
    }

    fn file_name(&self, name: &str) -> String {
        match self {
            CompletionShell::Bash => Shell::Bash.file_name(name),
            CompletionShell::Zsh => Shell::Zsh.file_name(name),
            CompletionShell::Fish => Shell::Fish.file_name(name),
            CompletionShell::PowerShell => Shell::PowerShell.file_name(name),
            CompletionShell::Elvish => Shell::Elvish.file_name(name),
            CompletionShell::Nushell => Nushell.file_name(name),
        }
    }
}

/// Options for the `log` command.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Path inside the repository to lay out
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Walk every local branch instead of only HEAD
    #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
    pub all: bool,

    /// Stop after this many commits
    ///
    /// Parents beyond the limit are treated as missing, so their branches end
    /// at the last row shown.
    #[arg(short = 'n', long)]
    pub max_count: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Output file to write to
    /// If not provided, prints to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl LogArgs {
    /// Merge the flags with the config file. Flags win.
    fn history_options(&self, config: &Config) -> HistoryOptions {
        HistoryOptions {
            all_branches: self.all || config.all_branches,
            max_count: self.max_count.or(config.max_count),
        }
    }

    fn use_color(&self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.output.is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// Helper trait for accessing verbosity flags on commands.
pub trait GetVerbosity {
    fn get_verbosity(&self) -> &Verbosity<WarnLevel>;
}

impl GetVerbosity for Cmd {
    fn get_verbosity(&self) -> &Verbosity<WarnLevel> {
        match self {
            Cmd::Log { verbosity, .. } => verbosity,
            Cmd::Completion { verbosity, .. } => verbosity,
        }
    }
}

impl Cmd {
    /// Execute the chosen top-level command.
    #[tracing::instrument(name = "Running command", level = "info", skip(self))]
    pub async fn run(&self, color: ColorChoice) -> AppResult<()> {
        match self {
            Cmd::Log { log, .. } => run_log(log, color).await,
            Cmd::Completion { shell, output, .. } => {
                let mut cmd = Cli::command();
                if let Some(output_path) = output {
                    let mut file = std::fs::OpenOptions::new()
                        .write(true)
                        .truncate(true)
                        .create(true)
                        .open(output_path)?;
                    // Write completion script to the requested file.
                    generate(shell, &mut cmd, "commit-lanes", &mut file);
                    info!(
                        "Generated completion script for {} at {}",
                        shell,
                        output_path.display()
                    );
                } else {
                    generate(shell, &mut cmd, "commit-lanes", &mut std::io::stdout());
                }
                Ok(())
            }
        }
    }
}

#[tracing::instrument(name = "Laying out history", level = "info", skip(args))]
async fn run_log(args: &LogArgs, color: ColorChoice) -> AppResult<()> {
    let config = Config::load()?;
    let palette = config.palette()?;
    let options = args.history_options(&config);

    let store = GraphStore::new();
    let load_path = args.path.clone();
    store
        .refresh(move || git::load_history(&load_path, &options))
        .await?;

    let status_path = args.path.clone();
    let uncommitted =
        tokio::task::spawn_blocking(move || git::has_uncommitted_changes(&status_path)).await??;

    let (log, error) = match store.status() {
        LogStatus::Loaded(log) => (log, None),
        LogStatus::Failed {
            message,
            fallback: Some(log),
        } => {
            warn!("{}, showing commits without lanes", message);
            (log, Some(message))
        }
        LogStatus::Failed {
            message,
            fallback: None,
        } => return Err(AppError::Other(message)),
        LogStatus::Loading => {
            return Err(AppError::Other(
                "graph computation did not finish".to_string(),
            ));
        }
    };

    match args.format {
        OutputFormat::Text => {
            let text = TextRenderer::new(&palette, args.use_color(color)).render(&log, uncommitted);
            write_text_output(args.output.as_deref(), &text).await
        }
        OutputFormat::Json => {
            let repository = std::fs::canonicalize(&args.path).unwrap_or_else(|_| args.path.clone());
            let snapshot =
                LogSnapshot::new(repository, uncommitted, &log, &palette).with_error(error);
            write_json_output(args.output.as_deref(), &snapshot).await
        }
    }
}
