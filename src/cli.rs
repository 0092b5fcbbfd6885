//! Command line definition

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eatsease")]
#[command(about = "Swipe through menu recommendations and keep up to 5 favourites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive swipe session
    Swipe {
        /// Use the built-in demo menu instead of the server
        #[arg(long)]
        offline: bool,
    },

    /// Replay a scripted session against the built-in demo menu
    Simulate {
        /// Swipes in order: R = like, L = dislike, N = drag released too early
        #[arg(short, long, default_value = "RRLRNRRR")]
        script: String,

        /// Candidates per page
        #[arg(short, long, default_value = "4")]
        page_size: usize,

        /// Simulated server latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,
    },

    /// Show the current liked list
    Liked,

    /// Remove a menu from the liked list
    Unlike {
        /// Menu name
        #[arg(required = true)]
        title: String,
    },

    /// Show or edit settings
    Config {
        /// Session token
        #[arg(long)]
        set_token: Option<String>,

        /// Username
        #[arg(long)]
        set_username: Option<String>,

        /// Profile service base URL
        #[arg(long)]
        set_base_url: Option<String>,

        /// Print settings
        #[arg(long)]
        show: bool,
    },
}

/// One scripted swipe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptStep {
    Like,
    Dislike,
    /// Drag that does not reach the commit threshold
    Nudge,
}

impl ScriptStep {
    /// Parse a whole script such as `RRLN`; whitespace and commas are ignored
    pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, String> {
        script
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| c.to_string().parse())
            .collect()
    }
}

impl std::str::FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "r" | "right" | "like" => Ok(ScriptStep::Like),
            "l" | "left" | "dislike" => Ok(ScriptStep::Dislike),
            "n" | "none" | "nudge" => Ok(ScriptStep::Nudge),
            _ => Err(format!("Unknown swipe: {}. Use R, L or N", s)),
        }
    }
}
