pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod envfile;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod listing;
pub mod middleware;
pub mod response;
pub mod security;
pub mod state;
