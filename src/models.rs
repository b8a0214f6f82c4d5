use serde::{Deserialize, Serialize};

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const YOUTUBE_WATCH: &str = "https://www.youtube.com/watch?v=";
const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed/";

/// One entry of a TMDB listing (trending, popular, search, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
}

impl MovieSummary {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    pub fn has_poster(&self) -> bool {
        self.poster_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn poster_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Cast or crew member as returned by the credits append.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Credits {
    pub cast: Vec<Person>,
    pub crew: Vec<Person>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Video {
    pub fn is_youtube(&self) -> bool {
        self.site == "YouTube"
    }

    pub fn watch_url(&self) -> String {
        format!("{YOUTUBE_WATCH}{}", self.key)
    }

    pub fn embed_url(&self) -> String {
        format!("{YOUTUBE_EMBED}{}?autoplay=1&playsinline=1", self.key)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct VideoList {
    pub results: Vec<Video>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SimilarMovies {
    pub results: Vec<MovieSummary>,
}

/// Detail page record. Every collection is present even when empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub runtime: u32,
    pub genres: Vec<Genre>,
    pub credits: Credits,
    pub videos: VideoList,
    pub similar: SimilarMovies,
}

impl MovieDetail {
    pub fn poster_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref())
    }
}

/// Persisted "My List" entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteEntry {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

impl From<&MovieSummary> for FavoriteEntry {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            name: movie.name.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            first_air_date: movie.first_air_date.clone(),
            vote_average: movie.vote_average,
        }
    }
}

impl From<&MovieDetail> for FavoriteEntry {
    fn from(movie: &MovieDetail) -> Self {
        Self {
            id: movie.id,
            title: Some(movie.title.clone()),
            name: None,
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            first_air_date: None,
            vote_average: Some(movie.vote_average),
        }
    }
}

fn image_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}{p}"))
}
