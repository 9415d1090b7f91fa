/// Movie metadata provider abstraction
///
/// Controllers talk to the metadata service only through this trait, so the
/// HTTP implementation can be swapped for a test double.
use crate::{
    error::FetchResult,
    models::{Movie, MovieId, TrailerKey},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Read-only access to a movie metadata service
///
/// Every call is an idempotent read that either returns the full result or a
/// `FetchError`. Implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// First page of the popular movies collection
    async fn fetch_popular(&self) -> FetchResult<Vec<Movie>>;

    /// First page of title search results
    ///
    /// The query is sent as given. Callers route empty queries to `fetch_popular`.
    async fn search(&self, query: &str) -> FetchResult<Vec<Movie>>;

    /// Details of a single movie
    async fn fetch_movie(&self, movie_id: MovieId) -> FetchResult<Movie>;

    /// Trailer for a movie, `None` when no playable trailer or teaser exists
    async fn fetch_trailer(&self, movie_id: MovieId) -> FetchResult<Option<TrailerKey>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
