use crate::config::ApiConfig;
use crate::person::{NewPerson, ValidationError};
use crate::repository::PersonRepository;
use crate::store::StoreError;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<PersonRepository>,
}

/// Response for a successful create-record call
#[derive(Debug, Serialize)]
pub struct CreatePersonResponse {
    pub message: String,
    pub total_records: usize,
}

/// Response for the count endpoint
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub rows: usize,
}

/// Errors surfaced by the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "detail": err.to_string(),
                    "field": err.field(),
                })),
            )
                .into_response(),
            ApiError::Store(err) => {
                error!(error = %err, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = if config.cors_enabled {
        if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/personas", post(create_persona))
        .route("/personas/count", get(count_personas))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "persona-service"
    }))
}

/// Append a validated person record to the document
#[instrument(skip(state, payload))]
async fn create_persona(
    State(state): State<AppState>,
    Json(payload): Json<NewPerson>,
) -> Result<Json<CreatePersonResponse>, ApiError> {
    let person = payload.validate()?;

    // Independent load-modify-save cycle per request; concurrent writers
    // race and the last upload wins.
    let mut records = state.repository.load().await?;
    records.push(person);
    state.repository.save(&records).await?;

    info!(total_records = records.len(), "Person record appended");

    Ok(Json(CreatePersonResponse {
        message: "Person record saved".to_string(),
        total_records: records.len(),
    }))
}

/// Count the records currently in the document
#[instrument(skip(state))]
async fn count_personas(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ApiError> {
    let records = state.repository.load().await?;

    Ok(Json(CountResponse {
        rows: records.len(),
    }))
}

/// Start the API server
pub async fn start_api_server(state: AppState, config: &ApiConfig) -> Result<()> {
    let router = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!(address = %addr, "Starting persona API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router)
        .await
        .context("API server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory object store for exercising handlers end to end
    struct InMemoryStore {
        object: Mutex<Option<Vec<u8>>>,
        fail_reads: bool,
        puts: AtomicUsize,
    }

    impl InMemoryStore {
        fn empty() -> Self {
            Self {
                object: Mutex::new(None),
                fail_reads: false,
                puts: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail_reads: true,
                ..Self::empty()
            }
        }

        fn object(&self) -> Option<Vec<u8>> {
            self.object.lock().unwrap().clone()
        }

        fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStore for InMemoryStore {
        async fn get(&self) -> Result<Option<Vec<u8>>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Read("connection refused".to_string()));
            }
            Ok(self.object())
        }

        async fn put(&self, body: Vec<u8>) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            *self.object.lock().unwrap() = Some(body);
            Ok(())
        }
    }

    fn state_with(store: Arc<InMemoryStore>) -> AppState {
        AppState {
            repository: Arc::new(PersonRepository::new(store)),
        }
    }

    fn payload(name: &str, age: i64, height: f64) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            age,
            height,
        }
    }

    #[tokio::test]
    async fn test_count_on_empty_store_is_zero() {
        let state = state_with(Arc::new(InMemoryStore::empty()));

        let Json(response) = count_personas(State(state)).await.unwrap();
        assert_eq!(response.rows, 0);
    }

    #[tokio::test]
    async fn test_create_then_count_scenario() {
        let store = Arc::new(InMemoryStore::empty());
        let state = state_with(store.clone());

        let Json(created) =
            create_persona(State(state.clone()), Json(payload("Ana", 30, 1.65)))
                .await
                .unwrap();
        assert_eq!(created.message, "Person record saved");
        assert_eq!(created.total_records, 1);
        assert_eq!(
            store.object().as_deref(),
            Some(b"name,age,height\nAna,30,1.65\n".as_slice())
        );

        let Json(count) = count_personas(State(state.clone())).await.unwrap();
        assert_eq!(count.rows, 1);

        let Json(created) =
            create_persona(State(state.clone()), Json(payload("Luis", 45, 1.80)))
                .await
                .unwrap();
        assert_eq!(created.total_records, 2);

        let Json(count) = count_personas(State(state)).await.unwrap();
        assert_eq!(count.rows, 2);
    }

    #[tokio::test]
    async fn test_create_stores_trimmed_name() {
        let store = Arc::new(InMemoryStore::empty());
        let state = state_with(store.clone());

        create_persona(State(state), Json(payload(" Ana ", 30, 1.65)))
            .await
            .unwrap();

        assert_eq!(
            store.object().as_deref(),
            Some(b"name,age,height\nAna,30,1.65\n".as_slice())
        );
    }

    #[tokio::test]
    async fn test_validation_failure_skips_store() {
        // A failing store proves the handler never reaches it
        let store = Arc::new(InMemoryStore::failing());
        let state = state_with(store.clone());

        let err = create_persona(State(state), Json(payload("Ana", 121, 1.65)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::AgeOutOfRange(121))
        ));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_prevents_write() {
        let store = Arc::new(InMemoryStore::failing());
        let state = state_with(store.clone());

        let err = create_persona(State(state), Json(payload("Ana", 30, 1.65)))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Store(StoreError::Read(_))));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_on_count() {
        let state = state_with(Arc::new(InMemoryStore::failing()));

        let err = count_personas(State(state)).await.unwrap_err();
        assert!(matches!(err, ApiError::Store(StoreError::Read(_))));
    }

    #[test]
    fn test_validation_error_maps_to_422() {
        let response = ApiError::Validation(ValidationError::EmptyName).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_store_error_maps_to_500() {
        let response =
            ApiError::Store(StoreError::Write("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
