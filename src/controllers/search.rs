use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::RwLock;
use tracing::instrument;

use crate::{
    models::{Movie, MovieId},
    services::MovieProvider,
};

/// Which collection the controller is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Result of the last popular-list fetch
    IdlePopular,
    /// A search is in flight or its result is shown
    Searching,
}

/// User-visible failure of the latest list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFailure {
    LoadFailed,
    SearchFailed,
}

impl ListFailure {
    pub fn message(&self) -> &'static str {
        match self {
            ListFailure::LoadFailed => "Failed to load movies",
            ListFailure::SearchFailed => "Failed to search movies",
        }
    }
}

/// What happened to one query change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The response replaced the displayed collection
    Applied { count: usize },
    /// The request failed; the displayed collection is unchanged
    Failed(ListFailure),
    /// A newer query was issued before this one completed; its response was dropped
    Superseded,
}

/// Read-only copy of the controller state for rendering
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub query: String,
    pub mode: ListMode,
    pub movies: Vec<Movie>,
    pub loading: bool,
    pub failure: Option<ListFailure>,
}

struct ListState {
    query: String,
    mode: ListMode,
    movies: Vec<Movie>,
    failure: Option<ListFailure>,
    /// Sequence number of the most recently issued request
    latest_seq: u64,
}

/// Marks a request as settled when its `set_query` future completes or is dropped
struct SettleGuard {
    seq: u64,
    settled_seq: Arc<AtomicU64>,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        // A superseded request never lowers the mark below a newer one.
        self.settled_seq.fetch_max(self.seq, Ordering::AcqRel);
    }
}

/// Owns the displayed movie list and the search query
///
/// Overlapping requests are ordered by sequence number: only the response to the
/// most recently issued request may touch the list.
#[derive(Clone)]
pub struct SearchController {
    provider: Arc<dyn MovieProvider>,
    state: Arc<RwLock<ListState>>,
    /// Sequence number of the most recently completed or abandoned request
    settled_seq: Arc<AtomicU64>,
}

impl SearchController {
    /// Creates a controller that reports `loading` until its first list request settles
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            provider,
            state: Arc::new(RwLock::new(ListState {
                query: String::new(),
                mode: ListMode::IdlePopular,
                movies: Vec::new(),
                failure: None,
                latest_seq: 1,
            })),
            settled_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Initial load of the popular list
    pub async fn load_popular(&self) -> QueryOutcome {
        self.set_query("").await
    }

    /// Reacts to an edit of the search box
    ///
    /// Empty or whitespace-only text shows the popular list, anything else is
    /// searched (trimmed) on the server.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn set_query(&self, query: &str) -> QueryOutcome {
        let trimmed = query.trim();
        let mode = if trimmed.is_empty() {
            ListMode::IdlePopular
        } else {
            ListMode::Searching
        };

        let seq = {
            let mut state = self.state.write().await;
            state.latest_seq += 1;
            state.query = query.to_string();
            state.mode = mode;
            state.latest_seq
        };
        let _settle = SettleGuard {
            seq,
            settled_seq: Arc::clone(&self.settled_seq),
        };

        let result = match mode {
            ListMode::IdlePopular => self.provider.fetch_popular().await,
            ListMode::Searching => self.provider.search(trimmed).await,
        };

        let mut state = self.state.write().await;
        if seq != state.latest_seq {
            tracing::debug!(
                seq,
                latest_seq = state.latest_seq,
                "Discarding response for superseded query"
            );
            return QueryOutcome::Superseded;
        }
        self.settled_seq.fetch_max(seq, Ordering::AcqRel);

        match result {
            Ok(movies) => {
                let count = movies.len();
                state.movies = movies;
                state.failure = None;
                tracing::info!(results = count, mode = ?mode, "Movie list updated");
                QueryOutcome::Applied { count }
            }
            Err(e) => {
                let failure = match mode {
                    ListMode::IdlePopular => ListFailure::LoadFailed,
                    ListMode::Searching => ListFailure::SearchFailed,
                };
                tracing::error!(error = %e, mode = ?mode, "Movie list request failed");
                state.failure = Some(failure);
                QueryOutcome::Failed(failure)
            }
        }
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.read().await;
        ListSnapshot {
            query: state.query.clone(),
            mode: state.mode,
            movies: state.movies.clone(),
            loading: self.settled_seq.load(Ordering::Acquire) < state.latest_seq,
            failure: state.failure,
        }
    }

    /// Looks up a displayed movie, e.g. to open its detail view
    pub async fn find(&self, movie_id: MovieId) -> Option<Movie> {
        let state = self.state.read().await;
        state.movies.iter().find(|m| m.id == movie_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FetchError, services::providers::MockMovieProvider};

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id: MovieId(id),
            title: title.to_string(),
            poster_path: String::new(),
            overview: String::new(),
            vote_average: 7.0,
            release_date: Some("2020-01-01".to_string()),
        }
    }

    fn server_error() -> FetchError {
        FetchError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        }
    }

    fn controller(mut mock: MockMovieProvider) -> SearchController {
        mock.expect_name().return_const("mock");
        SearchController::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_initial_load_fetches_popular() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .times(1)
            .returning(|| Ok(vec![movie(1, "Dune"), movie(2, "Barbie")]));
        mock.expect_search().never();

        let controller = controller(mock);
        let outcome = controller.load_popular().await;

        assert_eq!(outcome, QueryOutcome::Applied { count: 2 });
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.mode, ListMode::IdlePopular);
        assert_eq!(snapshot.movies.len(), 2);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.failure, None);
    }

    #[tokio::test]
    async fn test_new_controller_is_loading_until_first_fetch() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .times(1)
            .returning(|| Err(server_error()));

        let controller = controller(mock);
        let before = controller.snapshot().await;
        assert!(before.loading);
        assert!(before.movies.is_empty());

        controller.load_popular().await;
        assert!(!controller.snapshot().await.loading);
    }

    #[tokio::test]
    async fn test_non_empty_query_searches_trimmed_text() {
        let mut mock = MockMovieProvider::new();
        mock.expect_search()
            .withf(|q: &str| q == "the matrix")
            .times(1)
            .returning(|_| Ok(vec![movie(603, "The Matrix")]));
        mock.expect_fetch_popular().never();

        let controller = controller(mock);
        let outcome = controller.set_query("  the matrix ").await;

        assert_eq!(outcome, QueryOutcome::Applied { count: 1 });
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.mode, ListMode::Searching);
        assert_eq!(snapshot.query, "  the matrix ");
        assert_eq!(snapshot.movies[0].title, "The Matrix");
    }

    #[tokio::test]
    async fn test_whitespace_query_fetches_popular() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .times(1)
            .returning(|| Ok(vec![movie(1, "Dune")]));
        mock.expect_search().never();

        let controller = controller(mock);
        controller.set_query("   \t").await;

        assert_eq!(controller.snapshot().await.mode, ListMode::IdlePopular);
    }

    #[tokio::test]
    async fn test_empty_search_results_clear_list() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .returning(|| Ok(vec![movie(1, "Dune")]));
        mock.expect_search()
            .withf(|q: &str| q == "zzzznotamovie")
            .returning(|_| Ok(vec![]));

        let controller = controller(mock);
        controller.load_popular().await;
        let outcome = controller.set_query("zzzznotamovie").await;

        assert_eq!(outcome, QueryOutcome::Applied { count: 0 });
        let snapshot = controller.snapshot().await;
        assert!(snapshot.movies.is_empty());
        assert_eq!(snapshot.failure, None);
    }

    #[tokio::test]
    async fn test_popular_failure_on_first_load_leaves_list_empty() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .times(1)
            .returning(|| Err(server_error()));

        let controller = controller(mock);
        let outcome = controller.load_popular().await;

        assert_eq!(outcome, QueryOutcome::Failed(ListFailure::LoadFailed));
        let snapshot = controller.snapshot().await;
        assert!(snapshot.movies.is_empty());
        assert_eq!(snapshot.failure, Some(ListFailure::LoadFailed));
        assert_eq!(
            snapshot.failure.map(|f| f.message()),
            Some("Failed to load movies")
        );
    }

    #[tokio::test]
    async fn test_search_failure_keeps_previous_list() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .returning(|| Ok(vec![movie(1, "Dune"), movie(2, "Barbie")]));
        mock.expect_search().returning(|_| Err(server_error()));

        let controller = controller(mock);
        controller.load_popular().await;
        let outcome = controller.set_query("oppenheimer").await;

        assert_eq!(outcome, QueryOutcome::Failed(ListFailure::SearchFailed));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.movies.len(), 2);
        assert_eq!(snapshot.failure.map(|f| f.message()), Some("Failed to search movies"));
    }

    #[tokio::test]
    async fn test_success_clears_previous_failure() {
        let mut mock = MockMovieProvider::new();
        let mut calls = 0;
        mock.expect_fetch_popular().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(server_error())
            } else {
                Ok(vec![movie(1, "Dune")])
            }
        });

        let controller = controller(mock);
        controller.load_popular().await;
        controller.load_popular().await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.failure, None);
        assert_eq!(snapshot.movies.len(), 1);
    }

    #[tokio::test]
    async fn test_find_displayed_movie() {
        let mut mock = MockMovieProvider::new();
        mock.expect_fetch_popular()
            .returning(|| Ok(vec![movie(1, "Dune"), movie(2, "Barbie")]));

        let controller = controller(mock);
        controller.load_popular().await;

        assert_eq!(
            controller.find(MovieId(2)).await.map(|m| m.title),
            Some("Barbie".to_string())
        );
        assert!(controller.find(MovieId(99)).await.is_none());
    }
}
