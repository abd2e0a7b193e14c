// src/app/api.rs
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

use crate::app::cancel::CancelToken;
use crate::app::types::{Movie, MovieDetails, SearchResponse};
use crate::config::AppConfig;

const READ_CHUNK: usize = 8 * 1024;
// a superseded request cannot abort a blocking send; these bound its thread
const CONNECT_TIMEOUT_SECS: u64 = 4;
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Something went wrong while contacting the movie database: {0}")]
    Transport(String),
    #[error("Something went wrong while contacting the movie database (HTTP {0})")]
    Status(u16),
    #[error("Movie not found")]
    NotFound,
    #[error("Unexpected response from the movie database: {0}")]
    Decode(String),
    #[error("No OMDb API key configured")]
    MissingApiKey,
    /// Superseded by a newer request. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// The two OMDb lookups the app needs. Implementations must honour the token:
/// once it is cancelled they should return `FetchError::Cancelled` promptly.
pub trait MovieApi: Send + Sync {
    fn search(&self, query: &str, cancel: &CancelToken) -> Result<Vec<Movie>, FetchError>;
    fn details(&self, imdb_id: &str, cancel: &CancelToken) -> Result<MovieDetails, FetchError>;
}

pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("popcorn/omdb")
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Transport(format!("http client build: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, FetchError> {
        Self::new(&cfg.api_base_url, cfg.omdb_api_key.clone())
    }

    fn url(&self, param: &str, value: &str) -> Result<String, FetchError> {
        let key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        Ok(format!(
            "{}?{}={}&apikey={}",
            self.base_url,
            param,
            urlencoding::encode(value),
            urlencoding::encode(key)
        ))
    }

    /// GET with the token checked before sending and between body chunks.
    fn fetch_body(&self, url: &str, cancel: &CancelToken) -> Result<Vec<u8>, FetchError> {
        cancel.check()?;
        let mut resp = self.client.get(url).send().map_err(|e| {
            if cancel.is_cancelled() {
                FetchError::Cancelled
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;
        cancel.check()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut body = Vec::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = resp
                .read(&mut buf)
                .map_err(|e| FetchError::Transport(format!("read body: {e}")))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
            cancel.check()?;
        }
        Ok(body)
    }
}

impl MovieApi for OmdbClient {
    fn search(&self, query: &str, cancel: &CancelToken) -> Result<Vec<Movie>, FetchError> {
        let url = self.url("s", query)?;
        debug!(%query, "GET search");
        let body = self.fetch_body(&url, cancel)?;
        parse_search(&body)
    }

    fn details(&self, imdb_id: &str, cancel: &CancelToken) -> Result<MovieDetails, FetchError> {
        let url = self.url("i", imdb_id)?;
        debug!(%imdb_id, "GET details");
        let body = self.fetch_body(&url, cancel)?;
        parse_details(&body)
    }
}

/// Stand-in when no HTTP client could be built; every lookup fails with the
/// underlying reason so the UI still shows something useful.
pub struct UnavailableApi(pub String);

impl MovieApi for UnavailableApi {
    fn search(&self, _query: &str, _cancel: &CancelToken) -> Result<Vec<Movie>, FetchError> {
        Err(FetchError::Transport(self.0.clone()))
    }

    fn details(&self, _imdb_id: &str, _cancel: &CancelToken) -> Result<MovieDetails, FetchError> {
        Err(FetchError::Transport(self.0.clone()))
    }
}

pub(crate) fn parse_search(body: &[u8]) -> Result<Vec<Movie>, FetchError> {
    let data: SearchResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if data.response.eq_ignore_ascii_case("false") {
        debug!(reason = ?data.error, "search sentinel");
        return Err(FetchError::NotFound);
    }
    Ok(data.search)
}

pub(crate) fn parse_details(body: &[u8]) -> Result<MovieDetails, FetchError> {
    let data: MovieDetails =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if data.response.eq_ignore_ascii_case("false") {
        debug!(reason = ?data.error, "details sentinel");
        return Err(FetchError::NotFound);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_payload_yields_movies() {
        let body = br#"{"Search":[
            {"Title":"Interstellar","Year":"2014","imdbID":"tt0816692","Type":"movie","Poster":"N/A"},
            {"Title":"Interstella 5555","Year":"2003","imdbID":"tt0368667","Type":"movie","Poster":"https://x/p.jpg"}
        ],"totalResults":"2","Response":"True"}"#;
        let movies = parse_search(body).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].imdb_id, "tt0816692");
        assert_eq!(movies[1].poster, "https://x/p.jpg");
    }

    #[test]
    fn sentinel_becomes_not_found() {
        let body = br#"{"Response":"False","Error":"Movie not found!"}"#;
        let err = parse_search(body).unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
        assert_eq!(err.to_string(), "Movie not found");
    }

    #[test]
    fn details_sentinel_becomes_not_found() {
        let body = br#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
        assert!(matches!(parse_details(body), Err(FetchError::NotFound)));
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse_search(b"<html>"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let api = OmdbClient::new("http://127.0.0.1:9/", None).unwrap();
        let err = api.search("matrix", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey));
    }

    #[test]
    fn cancelled_token_short_circuits() {
        let api = OmdbClient::new("http://127.0.0.1:9/", Some("k".into())).unwrap();
        let token = CancelToken::new();
        token.cancel();
        assert!(api.details("tt0133093", &token).unwrap_err().is_cancelled());
    }

    #[test]
    fn query_is_encoded() {
        let api = OmdbClient::new("http://www.omdbapi.com/", Some("k y".into())).unwrap();
        let url = api.url("s", "star wars & co").unwrap();
        assert_eq!(
            url,
            "http://www.omdbapi.com/?s=star%20wars%20%26%20co&apikey=k%20y"
        );
    }

    #[test]
    fn transport_messages_fit_both_lookups() {
        let status = FetchError::Status(503).to_string();
        assert_eq!(
            status,
            "Something went wrong while contacting the movie database (HTTP 503)"
        );
        assert!(!FetchError::Transport("reset".into()).to_string().contains("fetching movies"));
    }
}
