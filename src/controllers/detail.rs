use std::sync::Arc;

use tokio::{
    sync::{watch, Mutex, RwLock},
    task::JoinHandle,
};
use tracing::instrument;

use crate::{
    models::{Movie, TrailerKey},
    services::MovieProvider,
};

pub const NO_TRAILER_NOTICE: &str = "No trailer available";
pub const TRAILER_LOADING_NOTICE: &str = "Trailer is still loading";
pub const TRAILER_FAILED_MESSAGE: &str = "Failed to fetch trailer";

/// Trailer state of the selected movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerState {
    Loading,
    Available(TrailerKey),
    Unavailable,
}

/// Result of pressing "watch trailer"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Play { embed_url: String },
    Notice(&'static str),
}

#[derive(Debug, Clone)]
pub struct DetailSnapshot {
    pub movie: Option<Movie>,
    pub trailer: TrailerState,
    pub failure: Option<&'static str>,
}

struct DetailState {
    movie: Option<Movie>,
    trailer: TrailerState,
    failure: Option<&'static str>,
    /// Bumped on every selection change; a trailer result only lands if it still matches
    generation: u64,
}

/// Raises the finished-generation mark once a lookup ends, is aborted, or never ran
struct LookupGuard {
    generation: u64,
    finished: Arc<watch::Sender<u64>>,
}

impl Drop for LookupGuard {
    fn drop(&mut self) {
        mark_finished(&self.finished, self.generation);
    }
}

fn mark_finished(finished: &watch::Sender<u64>, generation: u64) {
    finished.send_if_modified(|current| {
        if *current < generation {
            *current = generation;
            true
        } else {
            false
        }
    });
}

/// Loads the trailer of the selected movie, once per selection
#[derive(Clone)]
pub struct DetailController {
    provider: Arc<dyn MovieProvider>,
    state: Arc<RwLock<DetailState>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Highest selection generation whose lookup is over
    finished: Arc<watch::Sender<u64>>,
}

impl DetailController {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        let (finished, _) = watch::channel(0);
        Self {
            provider,
            state: Arc::new(RwLock::new(DetailState {
                movie: None,
                trailer: TrailerState::Loading,
                failure: None,
                generation: 0,
            })),
            task: Arc::new(Mutex::new(None)),
            finished: Arc::new(finished),
        }
    }

    /// Shows `movie` and starts its trailer lookup in the background
    ///
    /// Any lookup still running for a previous selection is aborted.
    #[instrument(skip(self, movie), fields(movie_id = %movie.id, provider = self.provider.name()))]
    pub async fn select(&self, movie: Movie) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let movie_id = movie.id;
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.movie = Some(movie);
            state.trailer = TrailerState::Loading;
            state.failure = None;
            state.generation
        };

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let guard = LookupGuard {
            generation,
            finished: Arc::clone(&self.finished),
        };

        *task = Some(tokio::spawn(async move {
            let _guard = guard;
            let result = provider.fetch_trailer(movie_id).await;

            let mut state = state.write().await;
            if state.generation != generation {
                tracing::debug!(movie_id = %movie_id, "Discarding trailer for closed selection");
                return;
            }

            let trailer = match result {
                Ok(Some(key)) => {
                    tracing::debug!(movie_id = %movie_id, key = %key, "Trailer available");
                    TrailerState::Available(key)
                }
                Ok(None) => TrailerState::Unavailable,
                Err(e) => {
                    tracing::error!(movie_id = %movie_id, error = %e, "Trailer fetch failed");
                    state.failure = Some(TRAILER_FAILED_MESSAGE);
                    TrailerState::Unavailable
                }
            };
            state.trailer = trailer;
        }));
    }

    /// Leaves the detail view; a pending trailer lookup is dropped
    pub async fn close(&self) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let mut state = self.state.write().await;
        state.generation += 1;
        state.movie = None;
        state.trailer = TrailerState::Loading;
        state.failure = None;
        mark_finished(&self.finished, state.generation);
    }

    /// Waits until the lookup for the current selection has finished or been aborted
    ///
    /// The task handle stays in place, so `close` and `select` can still abort it.
    pub async fn settled(&self) {
        let target = self.state.read().await.generation;
        let mut finished = self.finished.subscribe();
        if finished.wait_for(|done| *done >= target).await.is_err() {
            tracing::warn!(generation = target, "Trailer lookup tracker closed");
        }
    }

    pub async fn trailer(&self) -> TrailerState {
        self.state.read().await.trailer.clone()
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        let state = self.state.read().await;
        DetailSnapshot {
            movie: state.movie.clone(),
            trailer: state.trailer.clone(),
            failure: state.failure,
        }
    }

    pub async fn play_trailer(&self) -> Playback {
        match self.trailer().await {
            TrailerState::Available(key) => Playback::Play {
                embed_url: key.embed_url(),
            },
            TrailerState::Unavailable => Playback::Notice(NO_TRAILER_NOTICE),
            TrailerState::Loading => Playback::Notice(TRAILER_LOADING_NOTICE),
        }
    }
}
