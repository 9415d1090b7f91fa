pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use controllers::{DetailController, SearchController};
pub use error::{FetchError, FetchResult};
pub use services::{MovieProvider, TmdbProvider};
