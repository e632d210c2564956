use async_trait::async_trait;
use std::sync::Arc;

use stronghold_core::ApplicationError;

use crate::{config::Config, repository::VillageRepository};

/// A marker trait for Command structs.
/// Commands are operations that change the state of the system.
pub trait Command: Send + Sync {
    type Output: Send;
}

/// A trait for handlers that execute Commands.
/// Handlers receive the repositories to work with; serializing concurrent
/// writes on the same village is up to them.
#[async_trait]
pub trait CommandHandler<C: Command> {
    async fn handle(
        &self,
        cmd: C,
        villages: &Arc<dyn VillageRepository>,
        config: &Arc<Config>,
    ) -> Result<C::Output, ApplicationError>;
}
