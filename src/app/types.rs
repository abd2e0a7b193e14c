// src/app/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::utils;

// ---- OMDb payloads ----

/// One row of a search response.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<Movie>,
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// Full record from the `i=` endpoint. OMDb sends every value as a string,
/// with `"N/A"` standing in for anything unknown.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MovieDetails {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl MovieDetails {
    pub fn runtime_minutes(&self) -> u32 {
        utils::parse_runtime_minutes(&self.runtime)
    }

    pub fn imdb_rating_value(&self) -> f32 {
        utils::parse_rating(&self.imdb_rating)
    }

    pub fn released_date(&self) -> Option<NaiveDate> {
        utils::parse_released(&self.released)
    }

    /// Freeze the record into a watched entry with the user's verdict.
    pub fn to_watched(&self, user_rating: u8, rating_decisions: Option<u32>) -> WatchedEntry {
        WatchedEntry {
            imdb_id: self.imdb_id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
            runtime: self.runtime_minutes(),
            imdb_rating: self.imdb_rating_value(),
            user_rating,
            count_rating_decisions: rating_decisions,
        }
    }
}

// ---- persisted ----

/// Serialized field names match what earlier builds wrote to storage.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
    pub runtime: u32,
    pub imdb_rating: f32,
    pub user_rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_rating_decisions: Option<u32>,
}
