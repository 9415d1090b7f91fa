pub mod detail;
pub mod search;

pub use detail::{DetailController, DetailSnapshot, Playback, TrailerState};
pub use search::{ListFailure, ListMode, ListSnapshot, QueryOutcome, SearchController};
