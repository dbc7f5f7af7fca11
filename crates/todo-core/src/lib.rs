pub mod auth;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod paths;
pub mod repo;
pub mod store;
pub mod task;
pub mod types;
pub mod user;

pub use error::{Result, TodoError};
