use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Identifier assigned to a movie by the metadata service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One movie as returned by the metadata service
///
/// Records are snapshots: a refresh replaces the whole record, never single fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Relative image path, empty when the service has no poster
    #[serde(default, deserialize_with = "null_as_default")]
    pub poster_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub vote_average: f64,
    /// Raw `YYYY-MM-DD` text, kept verbatim even when malformed
    #[serde(default)]
    pub release_date: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    /// Full poster URL, or `None` when the movie has no poster
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        if self.poster_path.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}",
            image_base.trim_end_matches('/'),
            self.poster_path
        ))
    }

    /// Parsed release date; `None` if absent or not `YYYY-MM-DD`
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date().map(|d| d.year())
    }
}

/// Envelope for list endpoints (`/movie/popular`, `/search/movie`)
#[derive(Debug, Deserialize)]
pub struct MovieListResponse {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<Movie>,
}
