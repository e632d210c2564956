use std::{env, sync::Arc};

use tokio::io::AsyncReadExt;

use stronghold_app::config::Config;
use stronghold_core::{ApplicationError, Result};

mod logs;
mod scenario;
use logs::setup_logging;

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();
    let config = Arc::new(Config::from_env()?);
    tracing::info!(
        speed = config.speed,
        morale_enabled = config.morale_enabled,
        seeded = config.seed.is_some(),
        "Configuration loaded."
    );

    let input = read_input(env::args().nth(1)).await?;
    let output = scenario::run(&input, config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Reads the whole input from the given file, or from stdin when the path is
/// missing or `-`.
async fn read_input(path: Option<String>) -> Result<String, ApplicationError> {
    match path.as_deref() {
        None | Some("-") => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            Ok(input)
        }
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
    }
}
