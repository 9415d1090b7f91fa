use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Video platform whose entries can be played back
pub const TRAILER_SITE: &str = "YouTube";

const TRAILER_TYPE: &str = "Trailer";
const TEASER_TYPE: &str = "Teaser";

/// One entry of `/movie/{id}/videos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Video {
    fn is_playable_promo(&self) -> bool {
        self.site == TRAILER_SITE
            && (self.video_type == TRAILER_TYPE || self.video_type == TEASER_TYPE)
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    pub results: Vec<Video>,
}

/// Key of a trailer on the video platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrailerKey(pub String);

impl TrailerKey {
    /// Embeddable autoplay URL for the trailer
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TrailerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Picks the trailer to play from a movie's video list.
///
/// Only YouTube entries of type Trailer or Teaser qualify. The first Trailer wins,
/// otherwise the first qualifying Teaser.
pub fn select_trailer(videos: &[Video]) -> Option<TrailerKey> {
    let mut candidates = videos.iter().filter(|v| v.is_playable_promo());
    let first = candidates.next()?;

    if first.video_type == TRAILER_TYPE {
        return Some(TrailerKey(first.key.clone()));
    }

    let chosen = candidates
        .find(|v| v.video_type == TRAILER_TYPE)
        .unwrap_or(first);

    Some(TrailerKey(chosen.key.clone()))
}
