pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod service;
pub mod types;
pub mod views;

pub use config::Config;
pub use error::ConsoleError;
pub use server::{ConsoleState, console_router};
