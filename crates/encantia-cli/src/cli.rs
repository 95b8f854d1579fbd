use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Encantia presence: heartbeat as a user and watch who is online.
#[derive(Parser, Debug)]
#[command(name = "encantia", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. `debug`, `encantia=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use an in-process store instead of Supabase.
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Heartbeat as a user and print the listing on every change until Ctrl-C.
    Online {
        /// Signed-in user id. Generated when running with `--memory`.
        #[arg(long, env = "ENCANTIA_USER_ID")]
        user_id: Option<String>,

        /// Supabase Auth access token for the user.
        #[arg(long, env = "ENCANTIA_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Display name shown in the listing.
        #[arg(long)]
        name: Option<String>,

        /// Extra user ids to watch besides the profiles table.
        #[arg(long = "watch", value_name = "USER_ID")]
        watch: Vec<String>,
    },

    /// Poll once and print the listing.
    Status {
        /// Users to show. Defaults to every profile.
        user_ids: Vec<String>,
    },

    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}
