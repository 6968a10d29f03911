pub mod app;
pub mod audit;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod mock_store;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
