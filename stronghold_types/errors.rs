pub mod app_error;
pub mod game_error;

pub use app_error::AppError;
pub use game_error::GameError;

pub type Result<T, E = GameError> = std::result::Result<T, E>;
