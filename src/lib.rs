pub mod board;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod store;
