mod in_memory;
mod village_repository;

pub use in_memory::*;
pub use village_repository::*;
