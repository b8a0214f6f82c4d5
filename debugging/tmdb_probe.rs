//! Run one catalog query against TMDB and print the shaped JSON.
//! Usage:
//!   cargo run --bin tmdb_probe -- category <trending|popular|upcoming>
//!   cargo run --bin tmdb_probe -- search <query...>
//!   cargo run --bin tmdb_probe -- movie <tmdb_id>
//!   cargo run --bin tmdb_probe -- videos <tmdb_id>
//!   cargo run --bin tmdb_probe -- recommendations <tmdb_id>
//!   cargo run --bin tmdb_probe -- top-rated
//! Requires TMDB_API_KEY and TMDB_ACCESS_TOKEN in the environment (.env supported).

use anyhow::{Context, Result};
use cineflow::catalog::{Catalog, Category};
use cineflow::config::TmdbConfig;
use cineflow::tmdb::TmdbClient;
use dotenvy::dotenv;
use serde_json::to_string_pretty;
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin tmdb_probe -- <category|search|movie|videos|recommendations|top-rated> [arg]");
    std::process::exit(1);
}

fn id_arg(args: &[String]) -> Result<i64> {
    args.get(2)
        .context("missing tmdb id")?
        .parse()
        .context("tmdb id must be an integer")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1) else { usage() };

    let client = TmdbClient::new(&TmdbConfig::from_env()?)?;
    let catalog = Catalog::new(Arc::new(client));

    let output = match command.as_str() {
        "category" => {
            let kind: Category = args.get(2).context("missing category")?.parse()?;
            to_string_pretty(&catalog.category(kind).await)?
        }
        "search" => to_string_pretty(&catalog.search(&args[2..].join(" ")).await)?,
        "movie" => to_string_pretty(&catalog.movie_details(id_arg(&args)?).await)?,
        "videos" => to_string_pretty(&catalog.movie_videos(id_arg(&args)?).await)?,
        "recommendations" => to_string_pretty(&catalog.recommendations(id_arg(&args)?).await)?,
        "top-rated" => to_string_pretty(&catalog.top_rated().await)?,
        _ => usage(),
    };
    println!("{output}");
    Ok(())
}
