mod movie;
mod video;

pub use movie::{Movie, MovieId, MovieListResponse};
pub use video::{select_trailer, TrailerKey, Video, VideoListResponse, TRAILER_SITE};
