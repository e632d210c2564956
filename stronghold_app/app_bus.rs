use std::sync::Arc;

use stronghold_core::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Command, CommandHandler},
    repository::VillageRepository,
};

/// AppBus (Mediator)
/// Central entry point of the application logic: it owns the configuration and
/// the repositories and dispatches commands to their handlers.
pub struct AppBus {
    config: Arc<Config>,
    villages: Arc<dyn VillageRepository>,
}

impl AppBus {
    pub fn new(config: Arc<Config>, villages: Arc<dyn VillageRepository>) -> Self {
        Self { config, villages }
    }

    /// Executes a command and returns its output.
    pub async fn execute<C, H>(&self, cmd: C, handler: &H) -> Result<C::Output, ApplicationError>
    where
        C: Command,
        H: CommandHandler<C>,
    {
        handler.handle(cmd, &self.villages, &self.config).await
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn villages(&self) -> &Arc<dyn VillageRepository> {
        &self.villages
    }
}
