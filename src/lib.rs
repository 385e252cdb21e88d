pub mod api;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod events;
pub mod flash;
pub mod models;
pub mod routes;
