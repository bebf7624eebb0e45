pub mod config;
pub mod function;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
