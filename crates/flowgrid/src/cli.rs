use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::flow::types::Bend;

#[derive(Parser)]
#[command(name = "flowgrid")]
#[command(author, version, about)]
#[command(long_about = "Lay out flowcharts on a spreadsheet-style grid.\n\n\
    Describe each step as a shape and an order spec, and flowgrid assigns every\n\
    step a cell and routes orthogonal connectors between them.\n\n\
    Examples:\n  \
    flowgrid layout --shapes terminator,decision,process,process --orders \"1;1:2,3;1;2\"\n  \
    flowgrid layout --file flow.yaml --format json\n  \
    flowgrid config set defaults.start B2\n  \
    flowgrid shapes                       List shape names")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Place nodes and route connectors for a flowchart
    Layout(LayoutArgs),

    /// List the shape names accepted in --shapes and request files
    Shapes,

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct LayoutArgs {
    /// Request file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Shape names, comma separated (e.g. terminator,decision,process)
    #[arg(long, value_delimiter = ',')]
    pub shapes: Vec<String>,

    /// Order specs, semicolon separated (e.g. "1;1:2,3;1")
    #[arg(long, value_delimiter = ';')]
    pub orders: Vec<String>,

    /// Cell of the first node (default G6)
    #[arg(long)]
    pub start: Option<String>,

    /// Shape width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Shape height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Cell padding in pixels
    #[arg(long)]
    pub pad: Option<f64>,

    /// Rows between consecutive nodes in one column
    #[arg(long)]
    pub gap: Option<u32>,

    /// Decision true targets as origin:target pairs (e.g. "1:2,4:6")
    #[arg(long)]
    pub true_branches: Option<String>,

    /// Decision false targets as origin:target pairs
    #[arg(long)]
    pub false_branches: Option<String>,

    /// Side true branches enter their target from
    #[arg(long, value_enum)]
    pub true_bend: Option<BendArg>,

    /// Side false branches enter their target from
    #[arg(long, value_enum)]
    pub false_bend: Option<BendArg>,

    /// Fixed length for straight vertical connectors, in pixels
    #[arg(long)]
    pub arrow_length: Option<f64>,

    /// Draw connectors without arrowheads
    #[arg(long)]
    pub no_arrowheads: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Emit renderer draw commands instead of the layout
    #[arg(long)]
    pub draw_list: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.start, defaults.gap, routing.false_bend)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BendArg {
    Up,
    Down,
}

impl From<BendArg> for Bend {
    fn from(arg: BendArg) -> Self {
        match arg {
            BendArg::Up => Bend::Up,
            BendArg::Down => Bend::Down,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Layout(args) => crate::commands::layout::run(args),
            Commands::Shapes => {
                crate::commands::layout::print_shapes();
                Ok(())
            }
            Commands::Config { command } => crate::commands::config::run(command),
            Commands::Completion { shell } => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Commands::Version => {
                crate::commands::print_version();
                Ok(())
            }
        }
    }
}

/// Install the stderr log subscriber for the chosen verbosity.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
