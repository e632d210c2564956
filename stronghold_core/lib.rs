use thiserror::Error;

pub use stronghold_types::errors::{AppError, GameError};

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ApplicationError {
    fn from(err: anyhow::Error) -> Self {
        ApplicationError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_convert_into_application_error() {
        let err: ApplicationError = GameError::NoUnitsSelected.into();
        assert!(matches!(err, ApplicationError::Game(GameError::NoUnitsSelected)));

        let err: ApplicationError = AppError::VillageNotFound(7).into();
        assert_eq!(err.to_string(), "Village 7 not found");

        let err: ApplicationError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ApplicationError::Unknown(msg) if msg == "boom"));
    }
}
