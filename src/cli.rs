use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "runpak")]
#[command(version)]
#[command(about = "List, extract and create Quake II .pak archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  runpak list pak0.pak                 list files in pak0.pak\n  \
  runpak extract pak0.pak -d baseq2    extract pak0.pak into baseq2/\n  \
  runpak create pak1.pak maps          pack everything under maps/ into pak1.pak")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the files in an archive
    List {
        /// PAK file path
        #[arg(value_name = "PAK")]
        pak: PathBuf,

        /// Show offsets and lengths
        #[arg(short = 'l', long = "long")]
        long: bool,
    },

    /// Extract every file from an archive
    Extract {
        /// PAK file path
        #[arg(value_name = "PAK")]
        pak: PathBuf,

        /// Extract files into exdir
        #[arg(short = 'd', value_name = "DIR")]
        extract_dir: Option<PathBuf>,

        /// Extract files to pipe, no messages
        #[arg(short = 'p')]
        pipe: bool,
    },

    /// Create an archive from a directory tree
    Create {
        /// PAK file to write
        #[arg(value_name = "PAK")]
        pak: PathBuf,

        /// Directory whose files are packed
        #[arg(value_name = "DIR")]
        source: PathBuf,

        /// Fail on names longer than 55 bytes instead of truncating them
        #[arg(long = "strict-names")]
        strict_names: bool,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || matches!(self.command, Command::Extract { pipe: true, .. })
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() {
            return "off";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
