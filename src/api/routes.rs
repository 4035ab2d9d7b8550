use axum::{
    routing::{get, post},
    Router,
    extract::{DefaultBodyLimit, Json, Query, State},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::api::models::{
    AskRequest, AskResponse, CaptureRequest, CaptureResponse, ConnectionStatus, PageQuery,
    SaveSettingsRequest, SourceOption, TestConnectionRequest,
};
use crate::api::response::{self, Reply};
use crate::extract::{page_key, ExtractionRecord};
use crate::store::{settings::validate_endpoint, EndpointConfig, PageSummary};
use crate::{llm, qa, AppState};

pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_body_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/pages", post(capture_handler).get(list_pages).delete(clear_pages))
        .route("/api/pages/records", get(page_records).delete(delete_page))
        .route("/api/sources", get(list_sources))
        .route("/api/ask", post(ask_handler))
        .route("/api/settings", get(load_settings).put(save_settings))
        .route("/api/settings/test", post(test_connection_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

fn logged<T>(action: &'static str, result: Result<T>) -> Result<T> {
    result.inspect_err(|err| match err {
        AppError::Validation(_) | AppError::NotFound(_) => {
            info!(action, error = %err, "request rejected")
        }
        _ => warn!(action, error = %err, "request failed"),
    })
}

async fn health() -> Reply<&'static str> {
    response::success("ok")
}

async fn capture_handler(
    State(state): State<AppState>,
    Json(req): Json<CaptureRequest>,
) -> Result<Reply<CaptureResponse>> {
    logged("capture", async {
        let record = ExtractionRecord::capture(&req.url, &req.title, &req.text, req.mode)?;
        let captures = state.pages.append(record.clone()).await?;
        Ok::<_, AppError>(response::success(CaptureResponse { record, captures }))
    }
    .await)
}

async fn list_pages(State(state): State<AppState>) -> Result<Reply<Vec<PageSummary>>> {
    logged("list_pages", state.pages.summaries().await.map(response::success))
}

async fn page_records(
    State(state): State<AppState>,
    Query(q): Query<PageQuery>,
) -> Result<Reply<Vec<ExtractionRecord>>> {
    logged("page_records", async {
        let records = state.pages.get(&page_key(&q.url)?).await?;
        Ok::<_, AppError>(response::success(records))
    }
    .await)
}

async fn delete_page(
    State(state): State<AppState>,
    Query(q): Query<PageQuery>,
) -> Result<Reply<()>> {
    logged("delete_page", async {
        let url = page_key(&q.url)?;
        if !state.pages.remove(&url).await? {
            return Err(AppError::NotFound("No cached text found for this page".to_string()));
        }
        Ok::<_, AppError>(response::done("Deleted cached text for this page"))
    }
    .await)
}

async fn clear_pages(State(state): State<AppState>) -> Result<Reply<()>> {
    logged("clear_pages", state.pages.clear().await)?;
    Ok(response::done("All cache cleared"))
}

async fn list_sources(State(state): State<AppState>) -> Result<Reply<Vec<SourceOption>>> {
    let summaries = logged("list_sources", state.pages.summaries().await)?;
    let sources = summaries
        .iter()
        .map(|s| SourceOption {
            url: s.url.clone(),
            label: s.source_label(),
        })
        .collect();
    Ok(response::success(sources))
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Reply<AskResponse>> {
    let answer = logged("ask", qa::answer(&state, &req.question, &req.source_url).await)?;
    Ok(response::success(AskResponse { answer }))
}

async fn load_settings(State(state): State<AppState>) -> Result<Reply<EndpointConfig>> {
    logged("load_settings", state.settings.load().await.map(response::success))
}

async fn save_settings(
    State(state): State<AppState>,
    Json(req): Json<SaveSettingsRequest>,
) -> Result<Reply<EndpointConfig>> {
    logged(
        "save_settings",
        state.settings.save(&req.endpoint, &req.model).await.map(response::success),
    )
}

async fn test_connection_handler(
    State(state): State<AppState>,
    Json(req): Json<TestConnectionRequest>,
) -> Result<Reply<ConnectionStatus>> {
    logged("test_connection", async {
        let endpoint = match req.endpoint {
            Some(endpoint) => validate_endpoint(&endpoint)?,
            None => state.settings.load().await?.endpoint,
        };
        llm::test_connection(&endpoint).await?;
        Ok::<_, AppError>(response::success(ConnectionStatus {
            endpoint,
            message: "Connection successful! API server is responding.".to_string(),
        }))
    }
    .await)
}
