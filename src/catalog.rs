use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{MovieDetail, MovieSummary, Video};
use crate::normalize::{self, LISTING_CAP, RECOMMENDATION_CAP};
use crate::tmdb::{ApiRequest, TmdbApi};

pub const PLACEHOLDER_COUNT: usize = 8;
pub const PLACEHOLDER_BASE_ID: i64 = 10_000;
const PLACEHOLDER_OVERVIEW: &str =
    "Content temporarily unavailable. Please check your internet connection.";
const DETAIL_UNAVAILABLE_TITLE: &str = "Content Unavailable";
const DETAIL_UNAVAILABLE_OVERVIEW: &str =
    "Movie details are temporarily unavailable. Please check your internet connection and try again.";
const DETAIL_APPENDS: &str = "credits,videos,similar,reviews,keywords";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Trending,
    Popular,
    Upcoming,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Trending, Category::Popular, Category::Upcoming];

    fn request(self) -> ApiRequest {
        match self {
            Category::Trending => ApiRequest::new("trending/movie/week"),
            Category::Popular => ApiRequest::new("movie/popular").param("page", 1),
            Category::Upcoming => ApiRequest::new("movie/upcoming").param("page", 1),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Trending => "Trending",
            Category::Popular => "Popular",
            Category::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(Category::Trending),
            "popular" => Ok(Category::Popular),
            "upcoming" => Ok(Category::Upcoming),
            _ => Err(anyhow::anyhow!("unknown category '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub trending: Vec<MovieSummary>,
    pub popular: Vec<MovieSummary>,
    pub upcoming: Vec<MovieSummary>,
}

/// The query functions the screens call. Every method degrades instead of failing.
#[derive(Clone)]
pub struct Catalog {
    tmdb: Arc<dyn TmdbApi>,
}

impl Catalog {
    pub fn new(tmdb: Arc<dyn TmdbApi>) -> Self {
        Self { tmdb }
    }

    pub async fn category(&self, kind: Category) -> Vec<MovieSummary> {
        match self.tmdb.fetch(&kind.request()).await {
            Ok(payload) => {
                let movies = normalize::listing(&payload, LISTING_CAP);
                if !movies.is_empty() {
                    return movies;
                }
                warn!(category = %kind, "TMDB returned no usable movies, serving placeholders");
            }
            Err(e) => {
                warn!(category = %kind, error = %e, "Category fetch failed, serving placeholders")
            }
        }
        placeholder_movies(kind)
    }

    /// Trending, popular and upcoming fetched concurrently.
    pub async fn home(&self) -> HomeFeed {
        let (trending, popular, upcoming) = tokio::join!(
            self.category(Category::Trending),
            self.category(Category::Popular),
            self.category(Category::Upcoming),
        );
        info!(
            trending = trending.len(),
            popular = popular.len(),
            upcoming = upcoming.len(),
            "Home feed loaded"
        );
        HomeFeed {
            trending,
            popular,
            upcoming,
        }
    }

    pub async fn search(&self, query: &str) -> Vec<MovieSummary> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let request = ApiRequest::new("search/movie")
            .param("query", query)
            .param("page", 1)
            .param("include_adult", false);
        match self.tmdb.fetch(&request).await {
            Ok(payload) => normalize::search_results(&payload),
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    pub async fn movie_details(&self, id: i64) -> MovieDetail {
        let request =
            ApiRequest::new(format!("movie/{id}")).param("append_to_response", DETAIL_APPENDS);
        match self.tmdb.fetch(&request).await {
            Ok(payload) => {
                if let Some(detail) = normalize::movie_detail(&payload) {
                    return detail;
                }
                warn!(id, "TMDB detail payload unusable, serving placeholder");
            }
            Err(e) => warn!(id, error = %e, "Movie detail fetch failed, serving placeholder"),
        }
        unavailable_detail(id)
    }

    pub async fn movie_videos(&self, id: i64) -> Vec<Video> {
        match self.tmdb.fetch(&ApiRequest::new(format!("movie/{id}/videos"))).await {
            Ok(payload) => normalize::playable_videos(&payload),
            Err(e) => {
                warn!(id, error = %e, "Video fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn trailer(&self, id: i64) -> Option<Video> {
        let videos = self.movie_videos(id).await;
        normalize::preferred_trailer(&videos).cloned()
    }

    pub async fn recommendations(&self, id: i64) -> Vec<MovieSummary> {
        let request = ApiRequest::new(format!("movie/{id}/recommendations"));
        match self.tmdb.fetch(&request).await {
            Ok(payload) => normalize::listing(&payload, RECOMMENDATION_CAP),
            Err(e) => {
                warn!(id, error = %e, "Recommendations fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn top_rated(&self) -> Vec<MovieSummary> {
        let request = ApiRequest::new("movie/top_rated").param("page", 1);
        match self.tmdb.fetch(&request).await {
            Ok(payload) => normalize::listing(&payload, LISTING_CAP),
            Err(e) => {
                warn!(error = %e, "Top rated fetch failed");
                Vec::new()
            }
        }
    }
}

pub fn placeholder_movies(kind: Category) -> Vec<MovieSummary> {
    let today = today();
    let mut rng = rand::rng();
    (0..PLACEHOLDER_COUNT)
        .map(|i| MovieSummary {
            id: PLACEHOLDER_BASE_ID + i as i64,
            title: Some(format!("{} Movie #{}", kind.label(), i + 1)),
            overview: Some(PLACEHOLDER_OVERVIEW.to_string()),
            release_date: Some(today.clone()),
            vote_average: Some(rng.random_range(7.5..9.5)),
            ..Default::default()
        })
        .collect()
}

pub fn unavailable_detail(id: i64) -> MovieDetail {
    MovieDetail {
        id,
        title: DETAIL_UNAVAILABLE_TITLE.to_string(),
        overview: DETAIL_UNAVAILABLE_OVERVIEW.to_string(),
        release_date: Some(today()),
        ..Default::default()
    }
}

fn today() -> String {
    Utc::now().date_naive().to_string()
}
