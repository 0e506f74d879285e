pub mod allocation;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
