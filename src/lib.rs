pub mod app;
pub mod config;
pub mod data;
pub mod datasets;
pub mod errors;
pub mod filter;
pub mod index;
pub mod map;
pub mod render;
pub mod spatial;
pub mod ui;
