//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use investa_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for room reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Summary, members, tallies and settlement
    Full,
    /// One-line room summary
    Summary,
    /// JSON output
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Full => OutputFormat::Full,
            OutputArg::Summary => OutputFormat::Summary,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for investa
#[derive(Parser, Debug)]
#[command(name = "investa")]
#[command(author, version, about = "Investment rooms - pool funds, vote on allocations, settle together")]
#[command(long_about = r#"
Investa runs group investment rooms: members pool contributions toward a goal,
vote on recommended allocations, and vote to stop assets before the pooled
return is settled back to every member in proportion to their contribution.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. INVESTA_* environment variables        e.g. INVESTA_VOTING__STOP_RULE=60%
3. ./investa.toml                         Project-level config
4. ~/.config/investa/config.toml          Global config

Example:
  investa simulate demos/tech-growth.toml
  investa simulate demos/tech-growth.toml --output json
  investa show-config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (defaults to `[output] format`, then `full`)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scripted room scenario against in-memory adapters
    Simulate {
        /// Scenario file (TOML)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,
    },
    /// Show configuration file locations and the effective configuration
    ShowConfig,
}
