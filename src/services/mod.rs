pub mod providers;

pub use providers::{MovieProvider, TmdbProvider};
