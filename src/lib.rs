pub mod components;
pub mod db;
pub mod forms;
pub mod models;
pub mod pdf;
pub mod permissions;
pub mod utils;

#[cfg(feature = "ssr")]
pub mod api;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod error;
#[cfg(feature = "ssr")]
pub mod operations;
