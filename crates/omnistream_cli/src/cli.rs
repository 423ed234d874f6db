use std::path::PathBuf;

use clap::{Parser, Subcommand};
use omnistream_core::{ConnectionMode, Platform};

#[derive(Debug, Parser)]
#[command(name = "omnistream")]
#[command(about = "Publish one video to many platforms at once")]
pub struct Cli {
    /// RON file with engine settings; defaults apply when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding connected accounts
    #[arg(long, global = true, default_value = ".omnistream")]
    pub state_dir: PathBuf,
    /// Also print operational logs to the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List supported platforms
    Platforms,
    /// List connected accounts
    Accounts,
    /// Connect an account for a platform
    Connect {
        platform: Platform,
        /// simulated or authenticated
        #[arg(long, default_value = "simulated")]
        mode: ConnectionMode,
        /// Access token for authenticated mode
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the account for a platform
    Disconnect { platform: Platform },
    /// Generate title, description and tags with Gemini
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "Douyin")]
        platform: Platform,
    },
    /// Upload a video to the selected platforms
    Publish {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Comma separated platform ids
        #[arg(long, value_delimiter = ',', required = true)]
        platforms: Vec<Platform>,
    },
}
