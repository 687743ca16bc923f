// Library exports for Tulong
// This allows integration tests and external code to use Tulong modules

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod sanitize;
pub mod state;
pub mod storage;
pub mod store;
