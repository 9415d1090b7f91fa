/// TMDB API provider
///
/// API Flow:
/// 1. Popular list: /movie/popular → first page of movies
/// 2. Title search: /search/movie → first page of matches
/// 3. Details: /movie/{id} → single movie
/// 4. Trailer: /movie/{id}/videos → video list, reduced to one trailer key
///
/// The API key is attached twice, as bearer token and as `api_key` parameter,
/// since the service accepts either form depending on key type.
use crate::{
    config::Config,
    error::{FetchError, FetchResult},
    models::{
        select_trailer, Movie, MovieId, MovieListResponse, TrailerKey, VideoListResponse,
    },
    services::providers::MovieProvider,
};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

const LANGUAGE: &str = "en-US";
const FIRST_PAGE: &str = "1";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self::with_client(HttpClient::new(), api_key, api_url)
    }

    /// Creates a provider on top of a preconfigured reqwest client
    pub fn with_client(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone())
    }

    /// Builds an authenticated GET with the fixed language parameter
    fn request(&self, path: &str, params: &[(&str, &str)]) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);

        self.http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .query(params)
    }

    fn popular_request(&self) -> RequestBuilder {
        self.request("/movie/popular", &[("page", FIRST_PAGE)])
    }

    fn search_request(&self, query: &str) -> RequestBuilder {
        self.request("/search/movie", &[("query", query), ("page", FIRST_PAGE)])
    }

    fn movie_request(&self, movie_id: MovieId) -> RequestBuilder {
        self.request(&format!("/movie/{}", movie_id), &[])
    }

    fn videos_request(&self, movie_id: MovieId) -> RequestBuilder {
        self.request(&format!("/movie/{}/videos", movie_id), &[])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> FetchResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_response(status, &body)
    }
}

/// Maps a raw response to either the decoded body or a `FetchError`
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> FetchResult<T> {
    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body,
            "External API request failed"
        );
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    tracing::debug!(response = %body, "Raw TMDB API response");

    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            response = %body,
            "Failed to deserialize TMDB response"
        );
        FetchError::Decode(e)
    })
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn fetch_popular(&self) -> FetchResult<Vec<Movie>> {
        let page: MovieListResponse = self.send(self.popular_request()).await?;

        tracing::info!(
            results = page.results.len(),
            provider = "tmdb",
            "Popular movies fetched"
        );

        Ok(page.results)
    }

    async fn search(&self, query: &str) -> FetchResult<Vec<Movie>> {
        let page: MovieListResponse = self.send(self.search_request(query)).await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(page.results)
    }

    async fn fetch_movie(&self, movie_id: MovieId) -> FetchResult<Movie> {
        let movie: Movie = self.send(self.movie_request(movie_id)).await?;

        tracing::info!(movie_id = %movie_id, provider = "tmdb", "Movie details fetched");

        Ok(movie)
    }

    async fn fetch_trailer(&self, movie_id: MovieId) -> FetchResult<Option<TrailerKey>> {
        let videos: VideoListResponse = self.send(self.videos_request(movie_id)).await?;
        let trailer = select_trailer(&videos.results);

        tracing::info!(
            movie_id = %movie_id,
            videos = videos.results.len(),
            trailer = ?trailer,
            provider = "tmdb",
            "Trailer lookup completed"
        );

        Ok(trailer)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
