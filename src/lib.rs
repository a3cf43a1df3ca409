// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod index;
pub mod player;
pub mod server;
pub mod sources;
pub mod views;
