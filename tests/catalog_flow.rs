use cineflow::catalog::{Catalog, Category, PLACEHOLDER_BASE_ID, PLACEHOLDER_COUNT};
use cineflow::tmdb::{ApiRequest, FetchError, TmdbApi, TmdbError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeTmdb {
    responses: HashMap<String, Value>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTmdb {
    fn with(responses: &[(&str, Value)]) -> Arc<Self> {
        Arc::new(Self {
            responses: responses
                .iter()
                .map(|(path, body)| (path.to_string(), body.clone()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn fetch(&self, request: &ApiRequest) -> Result<Value, TmdbError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .get(&request.path)
            .cloned()
            .ok_or_else(|| TmdbError::Exhausted {
                path: request.path.clone(),
                last: FetchError::Timeout(Duration::from_secs(20)),
            })
    }
}

fn movie(id: i64, poster: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {id}"),
        "poster_path": poster,
        "release_date": "2024-01-01",
        "vote_average": 6.5,
        "popularity": id as f64,
    })
}

fn catalog(tmdb: Arc<FakeTmdb>) -> Catalog {
    Catalog::new(tmdb)
}

#[tokio::test]
async fn category_returns_real_results_capped() {
    let results: Vec<Value> = (1..=25).map(|i| movie(i, Some("/p.jpg"))).collect();
    let tmdb = FakeTmdb::with(&[("trending/movie/week", json!({ "results": results }))]);
    let movies = catalog(tmdb.clone()).category(Category::Trending).await;

    assert_eq!(movies.len(), 20);
    assert!(movies.iter().all(|m| m.id < PLACEHOLDER_BASE_ID));
    assert_eq!(movies[0].id, 1);
    assert_eq!(tmdb.requests()[0].get_param("page"), None);
}

#[tokio::test]
async fn category_keeps_only_poster_bearing_results() {
    let tmdb = FakeTmdb::with(&[(
        "movie/popular",
        json!({ "results": [movie(1, None), movie(2, Some("/two.jpg")), movie(3, None)] }),
    )]);
    let movies = catalog(tmdb.clone()).category(Category::Popular).await;

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, 2);
    assert_eq!(tmdb.requests()[0].get_param("page"), Some("1"));
}

#[tokio::test]
async fn category_failure_serves_placeholders() {
    for kind in Category::ALL {
        let movies = catalog(FakeTmdb::offline()).category(kind).await;
        assert_eq!(movies.len(), PLACEHOLDER_COUNT);
        let ids: Vec<i64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, (10_000..10_008).collect::<Vec<_>>());
        for m in &movies {
            let rating = m.vote_average.unwrap();
            assert!((7.5..9.5).contains(&rating), "rating {rating} out of range");
        }
    }
}

#[tokio::test]
async fn category_without_usable_results_serves_placeholders() {
    let tmdb = FakeTmdb::with(&[("movie/upcoming", json!({ "results": [movie(4, None)] }))]);
    let movies = catalog(tmdb).category(Category::Upcoming).await;
    assert_eq!(movies.len(), PLACEHOLDER_COUNT);
    assert_eq!(movies[0].title.as_deref(), Some("Upcoming Movie #1"));
}

#[tokio::test]
async fn home_joins_all_three_categories() {
    let tmdb = FakeTmdb::with(&[
        ("trending/movie/week", json!({ "results": [movie(1, Some("/a.jpg"))] })),
        ("movie/popular", json!({ "results": [movie(2, Some("/b.jpg"))] })),
    ]);
    let feed = catalog(tmdb.clone()).home().await;

    assert_eq!(feed.trending[0].id, 1);
    assert_eq!(feed.popular[0].id, 2);
    assert_eq!(feed.upcoming.len(), PLACEHOLDER_COUNT);
    assert_eq!(tmdb.requests().len(), 3);
}

#[tokio::test]
async fn blank_search_skips_network() {
    let tmdb = FakeTmdb::offline();
    let catalog = catalog(tmdb.clone());
    assert!(catalog.search("").await.is_empty());
    assert!(catalog.search("   ").await.is_empty());
    assert!(tmdb.requests().is_empty());
}

#[tokio::test]
async fn search_orders_by_popularity_and_sends_filters() {
    let payload = json!({ "results": [
        {"id": 1, "title": "A", "poster_path": "/a.jpg", "popularity": 3.0},
        {"id": 2, "title": "B", "poster_path": "/b.jpg", "popularity": 9.0},
        {"id": 3, "title": "C", "poster_path": "/c.jpg", "popularity": 1.0},
    ]});
    let tmdb = FakeTmdb::with(&[("search/movie", payload)]);
    let hits = catalog(tmdb.clone()).search("  heat ").await;

    let popularity: Vec<f64> = hits.iter().map(|m| m.popularity.unwrap()).collect();
    assert_eq!(popularity, vec![9.0, 3.0, 1.0]);

    let request = &tmdb.requests()[0];
    assert_eq!(request.get_param("query"), Some("heat"));
    assert_eq!(request.get_param("include_adult"), Some("false"));
}

#[tokio::test]
async fn search_drops_hits_without_posters() {
    let payload = json!({ "results": [
        {"id": 1, "title": "Null poster", "poster_path": null, "popularity": 90.0},
        {"id": 2, "title": "Empty poster", "poster_path": "", "popularity": 80.0},
        {"id": 3, "title": "No poster field", "popularity": 70.0},
        {"id": 4, "title": "Kept", "poster_path": "/d.jpg", "popularity": 2.0},
        {"id": 5, "title": "Kept too", "poster_path": "/e.jpg", "popularity": 5.0},
    ]});
    let tmdb = FakeTmdb::with(&[("search/movie", payload)]);
    let hits = catalog(tmdb).search("poster").await;

    let ids: Vec<i64> = hits.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5, 4]);
}

#[tokio::test]
async fn search_failure_is_empty() {
    assert!(catalog(FakeTmdb::offline()).search("heat").await.is_empty());
}

#[tokio::test]
async fn details_are_shaped() {
    let payload = json!({
        "id": 603,
        "title": "The Matrix",
        "overview": "Wake up.",
        "genres": [{"id": 28, "name": "Action"}],
        "runtime": 136,
        "vote_average": 8.2,
        "credits": {
            "cast": (0..30).map(|i| json!({"id": i, "name": format!("Cast {i}")})).collect::<Vec<_>>(),
            "crew": (0..30).map(|i| json!({"id": i, "name": format!("Crew {i}")})).collect::<Vec<_>>(),
        },
        "videos": {"results": [
            {"key": "teaser", "site": "YouTube", "type": "Teaser"},
            {"key": "trailer", "site": "YouTube", "type": "Trailer"},
        ]},
        "similar": {"results": (0..15).map(|i| movie(i, Some("/s.jpg"))).collect::<Vec<_>>()},
    });
    let tmdb = FakeTmdb::with(&[("movie/603", payload)]);
    let detail = catalog(tmdb.clone()).movie_details(603).await;

    assert_eq!(detail.title, "The Matrix");
    assert_eq!(detail.genres[0].name, "Action");
    assert_eq!(detail.credits.cast.len(), 20);
    assert_eq!(detail.credits.crew.len(), 10);
    assert_eq!(detail.videos.results.len(), 1);
    assert_eq!(detail.videos.results[0].key, "trailer");
    assert_eq!(detail.similar.results.len(), 10);
    assert_eq!(
        tmdb.requests()[0].get_param("append_to_response"),
        Some("credits,videos,similar,reviews,keywords")
    );
}

#[tokio::test]
async fn details_failure_returns_placeholder() {
    let detail = catalog(FakeTmdb::offline()).movie_details(11).await;
    assert_eq!(detail.id, 11);
    assert_eq!(detail.title, "Content Unavailable");
    assert_eq!(detail.vote_average, 0.0);
    assert!(detail.genres.is_empty());
    assert!(detail.credits.cast.is_empty());
}

#[tokio::test]
async fn details_with_unusable_payload_returns_placeholder() {
    let tmdb = FakeTmdb::with(&[("movie/12", json!({"success": false, "status_code": 34}))]);
    let detail = catalog(tmdb).movie_details(12).await;
    assert_eq!(detail.id, 12);
    assert_eq!(detail.title, "Content Unavailable");
}

#[tokio::test]
async fn videos_are_youtube_trailers_then_teasers() {
    let payload = json!({ "results": [
        {"key": "t1", "site": "YouTube", "type": "Teaser", "official": true},
        {"key": "v1", "site": "Vimeo", "type": "Trailer", "official": true},
        {"key": "r1", "site": "YouTube", "type": "Trailer", "official": true},
        {"key": "t2", "site": "YouTube", "type": "Teaser", "official": true},
        {"key": "r2", "site": "YouTube", "type": "Trailer", "official": true},
        {"key": "r3", "site": "YouTube", "type": "Trailer", "official": true},
        {"key": "r4", "site": "YouTube", "type": "Trailer", "official": true},
    ]});
    let tmdb = FakeTmdb::with(&[("movie/5/videos", payload)]);
    let catalog = catalog(tmdb);
    let videos = catalog.movie_videos(5).await;

    let keys: Vec<&str> = videos.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["r1", "r2", "r3", "r4", "t1"]);
    assert!(videos.iter().all(|v| v.site == "YouTube"));

    let trailer = catalog.trailer(5).await.unwrap();
    assert_eq!(trailer.key, "r1");
}

#[tokio::test]
async fn secondary_lists_degrade_to_empty() {
    let catalog = catalog(FakeTmdb::offline());
    assert!(catalog.movie_videos(1).await.is_empty());
    assert!(catalog.trailer(1).await.is_none());
    assert!(catalog.recommendations(1).await.is_empty());
    assert!(catalog.top_rated().await.is_empty());
}

#[tokio::test]
async fn recommendations_and_top_rated_are_capped() {
    let many: Vec<Value> = (1..=30).map(|i| movie(i, Some("/p.jpg"))).collect();
    let tmdb = FakeTmdb::with(&[
        ("movie/9/recommendations", json!({ "results": many })),
        ("movie/top_rated", json!({ "results": many })),
    ]);
    let catalog = catalog(tmdb);
    assert_eq!(catalog.recommendations(9).await.len(), 10);
    assert_eq!(catalog.top_rated().await.len(), 20);
}
