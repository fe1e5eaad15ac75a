use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use echolingo_export::EXPORT_FILENAME;
use echolingo_types::{
    IdiomLookup, LexMode, SaveOutcome, SavedIdiom, SavedWord, WordLookup,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/lookup", post(lookup))
        .route("/api/save", post(save).get(save_status))
        .route("/api/saved", get(saved))
        .route("/api/export", get(export))
        .route("/api/import", post(import))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct LookupRequest {
    #[serde(default)]
    word: String,
    mode: LexMode,
}

#[derive(Serialize)]
#[serde(untagged)]
enum LookupResponse {
    Word(WordLookup),
    Idiom(IdiomLookup),
}

async fn lookup(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let response = match request.mode {
        LexMode::Vocabulary => LookupResponse::Word(state.lookup.word(&request.word).await?),
        LexMode::Idiom => LookupResponse::Idiom(state.lookup.idiom(&request.word).await?),
    };
    Ok(Json(response))
}

#[derive(Deserialize)]
struct SaveRequest {
    mode: LexMode,
    data: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    success: bool,
    data: Option<serde_json::Value>,
    is_already_saved: bool,
    message: String,
}

async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let response = match request.mode {
        LexMode::Vocabulary => {
            let lookup: WordLookup = serde_json::from_value(request.data)
                .map_err(|e| ApiError::bad_request(format!("invalid word payload: {e}")))?;
            save_response(state.store.save_word(lookup).await?, "Word")?
        }
        LexMode::Idiom => {
            let lookup: IdiomLookup = serde_json::from_value(request.data)
                .map_err(|e| ApiError::bad_request(format!("invalid idiom payload: {e}")))?;
            save_response(state.store.save_idiom(lookup).await?, "Idiom")?
        }
    };
    Ok(Json(response))
}

fn save_response<T: Serialize>(
    outcome: SaveOutcome<T>,
    kind: &str,
) -> Result<SaveResponse, ApiError> {
    Ok(match outcome {
        SaveOutcome::Created(saved) => SaveResponse {
            success: true,
            data: Some(
                serde_json::to_value(&saved)
                    .map_err(|e| ApiError::internal(format!("encode failure: {e}")))?,
            ),
            is_already_saved: false,
            message: format!("{kind} saved"),
        },
        SaveOutcome::AlreadySaved => SaveResponse {
            success: true,
            data: None,
            is_already_saved: true,
            message: format!("{kind} is already saved"),
        },
    })
}

#[derive(Deserialize)]
struct SaveStatusQuery {
    word: String,
    mode: LexMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveStatusResponse {
    is_saved: bool,
    word: String,
    mode: LexMode,
}

async fn save_status(
    State(state): State<AppState>,
    Query(query): Query<SaveStatusQuery>,
) -> Result<Json<SaveStatusResponse>, ApiError> {
    let is_saved = match query.mode {
        LexMode::Vocabulary => state.store.word_exists(&query.word).await?,
        LexMode::Idiom => state.store.idiom_exists(&query.word).await?,
    };
    Ok(Json(SaveStatusResponse {
        is_saved,
        word: query.word,
        mode: query.mode,
    }))
}

#[derive(Deserialize)]
struct SavedQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedData {
    words: Vec<SavedWord>,
    idioms: Vec<SavedIdiom>,
    total_words: usize,
    total_idioms: usize,
}

#[derive(Serialize)]
struct SavedResponse {
    success: bool,
    data: SavedData,
}

async fn saved(
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> Result<Json<SavedResponse>, ApiError> {
    let (want_words, want_idioms) = match query.kind.as_deref() {
        None | Some("all") => (true, true),
        Some("words") => (true, false),
        Some("idioms") => (false, true),
        Some(other) => {
            return Err(ApiError::bad_request(format!("unknown type: {other}")));
        }
    };

    let words = if want_words {
        state.store.list_words().await?
    } else {
        vec![]
    };
    let idioms = if want_idioms {
        state.store.list_idioms().await?
    } else {
        vec![]
    };

    Ok(Json(SavedResponse {
        success: true,
        data: SavedData {
            total_words: words.len(),
            total_idioms: idioms.len(),
            words,
            idioms,
        },
    }))
}

async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let words = state.store.list_words().await?;
    let idioms = state.store.list_idioms().await?;
    let csv = echolingo_export::anki_csv(&words, &idioms, Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    ))
}

#[derive(Deserialize)]
struct ImportRequest {
    /// Already-normalized word payloads to upsert as-is
    #[serde(default)]
    words: Vec<WordLookup>,
    /// Raw terms to look up (batch retry policy) before the upsert
    #[serde(default)]
    terms: Vec<String>,
}

#[derive(Serialize)]
struct ImportResponse {
    success: bool,
    imported: usize,
    updated: usize,
}

async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut words = request.words;
    for term in &request.terms {
        words.push(state.batch_lookup.word(term).await?);
    }

    let report = state.store.import_words(words).await?;
    Ok(Json(ImportResponse {
        success: true,
        imported: report.imported,
        updated: report.updated,
    }))
}
