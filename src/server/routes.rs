// src/server/routes.rs
// =============================================================================
// Request handlers for the web service.
//
// Endpoints:
// - GET  /scrape?url=...&max_related=N
// - POST /scrape   {"url": "...", "max_related": N}
// - GET  /health
//
// Both /scrape forms do the same thing: fetch the seed page, read its title
// and description, convert it to Markdown and crawl up to N related pages.
//
// Rust concepts:
// - Extractors: State, Query and Json pull typed data out of the request
// - IntoResponse: lets our own error type turn into an HTTP response
// =============================================================================

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::crawl::{ConvertedPage, Crawler};
use crate::error::CrawlError;
use crate::page::{parse_target, FetchResult};

// Upper bound on related pages a single request may ask for
const MAX_RELATED_LIMIT: usize = 25;

// Shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub crawler: Crawler,
    /// Related pages crawled when the request doesn't say
    pub default_max_related: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    pub max_related: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub html: String,
    pub markdown: String,
    pub related_pages: Vec<ConvertedPage>,
}

// Errors a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Crawl(#[from] CrawlError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Crawl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub async fn scrape_get(
    State(state): State<Arc<AppState>>,
    Query(request): Query<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    scrape(&state, request).await.map(Json)
}

pub async fn scrape_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    scrape(&state, request).await.map(Json)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn scrape(state: &AppState, request: ScrapeRequest) -> Result<ScrapeResponse, ApiError> {
    info!("New scraping request for {}", request.url);

    let url = parse_target(&request.url).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let max_related = request
        .max_related
        .unwrap_or(state.default_max_related)
        .min(MAX_RELATED_LIMIT);

    let html = match state.crawler.fetcher().fetch_body(&url).await {
        FetchResult::Html { body, .. } => body,
        FetchResult::NonHtml { content_type } => {
            return Err(log_failure(CrawlError::SeedNotHtml {
                url: url.to_string(),
                content_type,
            }))
        }
        FetchResult::Failed(e) => return Err(log_failure(CrawlError::Seed(e))),
    };

    let result = state.crawler.crawl_page(&html, &url, max_related).await;

    info!(
        "Processed {} with {} related page(s)",
        url,
        result.related_pages.len()
    );

    Ok(ScrapeResponse {
        url: url.to_string(),
        title: result.seed_meta.title,
        description: result.seed_meta.description,
        html,
        markdown: result.seed_markdown,
        related_pages: result.related_pages,
    })
}

fn log_failure(err: CrawlError) -> ApiError {
    error!("Scrape failed: {}", err);
    ApiError::Crawl(err)
}
