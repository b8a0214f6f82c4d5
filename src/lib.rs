pub mod app;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod models;
pub mod normalize;
pub mod tmdb;
