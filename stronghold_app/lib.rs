pub mod app_bus;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod locks;
pub mod repository;
