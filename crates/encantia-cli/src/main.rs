//! encantia: presence heartbeat and online listing for the Encantia community.

mod cli;
mod commands;
mod logging;

use encantia_common::Result;

use crate::cli::Command;
use crate::logging::Logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse();

    // Installed before loading so config warnings are recorded.
    let logging = Logging::init(args.log_level.as_deref());
    let config = encantia_config::load_config(args.config.as_deref())?;
    logging.apply_config(config.logging.level);
    tracing::debug!(config = ?config, "Configuration loaded");

    match args.command {
        Command::Online {
            user_id,
            access_token,
            name,
            watch,
        } => commands::online(&config, args.memory, user_id, access_token, name, watch).await,
        Command::Status { user_ids } => commands::status(&config, args.memory, user_ids).await,
        Command::Config => {
            commands::show_config(&config);
            Ok(())
        }
    }
}
