use crate::catalog::{Catalog, Category, HomeFeed};
use crate::config::AppConfig;
use crate::favorites::{FavoritesStore, FileStore, KeyValueStore};
use crate::models::{FavoriteEntry, MovieDetail, MovieSummary, Video};
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub favorites: Arc<Mutex<FavoritesStore>>,
}

impl AppState {
    pub fn new(catalog: Catalog, favorites: FavoritesStore) -> Self {
        Self {
            catalog,
            favorites: Arc::new(Mutex::new(favorites)),
        }
    }
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(&config.tmdb)?);
    info!("Using TMDB at {}", config.tmdb.base_url);

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
    let favorites = FavoritesStore::load(storage).await;
    info!("My list stored in {}", config.data_dir.display());

    let app = build_router(AppState::new(Catalog::new(tmdb), favorites));

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/home", get(home))
        .route("/search", get(search))
        .route("/movies/top-rated", get(top_rated))
        .route("/movies/category/:kind", get(category))
        .route("/movies/:id", get(movie_details))
        .route("/movies/:id/videos", get(movie_videos))
        .route("/movies/:id/trailer", get(trailer))
        .route("/movies/:id/recommendations", get(recommendations))
        .route("/my-list", get(my_list).post(add_to_list))
        .route("/my-list/:id", get(is_saved).delete(remove_from_list))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn home(State(state): State<AppState>) -> Json<HomeFeed> {
    Json(state.catalog.home().await)
}

async fn category(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<MovieSummary>>, StatusCode> {
    let kind: Category = kind.parse().map_err(|e| {
        warn!("Rejecting category request: {}", e);
        StatusCode::NOT_FOUND
    })?;
    Ok(Json(state.catalog.category(kind).await))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<MovieSummary>> {
    Json(state.catalog.search(&params.query).await)
}

async fn top_rated(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    Json(state.catalog.top_rated().await)
}

async fn movie_details(State(state): State<AppState>, Path(id): Path<i64>) -> Json<MovieDetail> {
    Json(state.catalog.movie_details(id).await)
}

async fn movie_videos(State(state): State<AppState>, Path(id): Path<i64>) -> Json<Vec<Video>> {
    Json(state.catalog.movie_videos(id).await)
}

#[derive(Serialize)]
struct TrailerResponse {
    key: String,
    name: Option<String>,
    #[serde(rename = "type")]
    video_type: String,
    watch_url: String,
    embed_url: String,
}

async fn trailer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TrailerResponse>, StatusCode> {
    let video = state.catalog.trailer(id).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TrailerResponse {
        watch_url: video.watch_url(),
        embed_url: video.embed_url(),
        key: video.key,
        name: video.name,
        video_type: video.video_type,
    }))
}

async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Vec<MovieSummary>> {
    Json(state.catalog.recommendations(id).await)
}

async fn my_list(State(state): State<AppState>) -> Json<Vec<FavoriteEntry>> {
    let store = state.favorites.lock().await;
    Json(store.list().to_vec())
}

async fn is_saved(State(state): State<AppState>, Path(id): Path<i64>) -> Json<Value> {
    let saved = state.favorites.lock().await.contains(id);
    Json(json!({ "id": id, "saved": saved }))
}

async fn add_to_list(
    State(state): State<AppState>,
    Json(entry): Json<FavoriteEntry>,
) -> (StatusCode, Json<Vec<FavoriteEntry>>) {
    let mut store = state.favorites.lock().await;
    let write = store.add(entry);
    let status = if write.changed() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    if let Err(e) = write.await {
        warn!("Failed to persist my list: {}", e);
    }
    (status, Json(store.list().to_vec()))
}

async fn remove_from_list(State(state): State<AppState>, Path(id): Path<i64>) -> StatusCode {
    let mut store = state.favorites.lock().await;
    if let Err(e) = store.remove(id).await {
        warn!("Failed to persist my list: {}", e);
    }
    StatusCode::NO_CONTENT
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
