//! Shapes raw TMDB payloads into the crate's record types.
//!
//! Nothing here fails: unreadable entries are dropped and missing
//! collections become empty.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    Credits, Genre, MovieDetail, MovieSummary, Person, SimilarMovies, Video, VideoList,
};

pub const LISTING_CAP: usize = 20;
pub const SEARCH_CAP: usize = 50;
pub const RECOMMENDATION_CAP: usize = 10;
pub const CAST_CAP: usize = 20;
pub const CREW_CAP: usize = 10;
pub const SIMILAR_CAP: usize = 10;
pub const VIDEO_CAP: usize = 5;

/// Poster-bearing entries of `results`, in API order, at most `cap`.
pub fn listing(payload: &Value, cap: usize) -> Vec<MovieSummary> {
    summaries(payload.get("results"))
        .into_iter()
        .filter(MovieSummary::has_poster)
        .take(cap)
        .collect()
}

/// Poster-bearing search hits, most popular first. Equal popularity keeps API order.
pub fn search_results(payload: &Value) -> Vec<MovieSummary> {
    let mut hits: Vec<MovieSummary> = summaries(payload.get("results"))
        .into_iter()
        .filter(MovieSummary::has_poster)
        .collect();
    hits.sort_by(|a, b| popularity(b).total_cmp(&popularity(a)));
    hits.truncate(SEARCH_CAP);
    hits
}

/// Returns `None` when the payload has no usable id.
pub fn movie_detail(payload: &Value) -> Option<MovieDetail> {
    let id = payload.get("id").and_then(Value::as_i64)?;

    let cast = entries::<Person>(payload.pointer("/credits/cast"))
        .into_iter()
        .take(CAST_CAP)
        .collect();
    let crew = entries::<Person>(payload.pointer("/credits/crew"))
        .into_iter()
        .take(CREW_CAP)
        .collect();
    let trailers = entries::<Video>(payload.pointer("/videos/results"))
        .into_iter()
        .filter(|v| v.video_type == "Trailer" && v.is_youtube())
        .collect();
    let similar = summaries(payload.pointer("/similar/results"))
        .into_iter()
        .take(SIMILAR_CAP)
        .collect();

    Some(MovieDetail {
        id,
        title: text(payload, "title")
            .or_else(|| text(payload, "name"))
            .unwrap_or_default(),
        overview: text(payload, "overview").unwrap_or_default(),
        tagline: text(payload, "tagline").filter(|t| !t.is_empty()),
        poster_path: text(payload, "poster_path"),
        backdrop_path: text(payload, "backdrop_path"),
        release_date: text(payload, "release_date"),
        vote_average: payload
            .get("vote_average")
            .and_then(Value::as_f64)
            .filter(|v| *v >= 0.0)
            .unwrap_or_default(),
        vote_count: payload
            .get("vote_count")
            .and_then(Value::as_u64)
            .unwrap_or_default(),
        runtime: payload
            .get("runtime")
            .and_then(Value::as_u64)
            .and_then(|r| u32::try_from(r).ok())
            .unwrap_or_default(),
        genres: entries::<Genre>(payload.get("genres")),
        credits: Credits { cast, crew },
        videos: VideoList { results: trailers },
        similar: SimilarMovies { results: similar },
    })
}

/// Official YouTube trailers and teasers, trailers first, at most five.
pub fn playable_videos(payload: &Value) -> Vec<Video> {
    let mut videos: Vec<Video> = entries::<Video>(payload.get("results"))
        .into_iter()
        .filter(|v| {
            v.is_youtube()
                && matches!(v.video_type.as_str(), "Trailer" | "Teaser")
                && v.official != Some(false)
        })
        .collect();
    videos.sort_by_key(|v| v.video_type != "Trailer");
    videos.truncate(VIDEO_CAP);
    videos
}

/// First YouTube trailer, otherwise the first YouTube video of any kind.
pub fn preferred_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.is_youtube() && v.video_type == "Trailer")
        .or_else(|| videos.iter().find(|v| v.is_youtube()))
}

fn entries<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Movie entries with negative ratings read as unrated.
fn summaries(value: Option<&Value>) -> Vec<MovieSummary> {
    let mut movies = entries::<MovieSummary>(value);
    for movie in &mut movies {
        if movie.vote_average.is_some_and(|v| v < 0.0) {
            movie.vote_average = None;
        }
    }
    movies
}

fn text(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn popularity(movie: &MovieSummary) -> f64 {
    movie.popularity.unwrap_or(0.0)
}
