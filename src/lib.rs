pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod responses;
pub mod services;
pub mod session;
