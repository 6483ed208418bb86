//! The routes of the server.

use std::sync::Arc;

use axum::extract::{self, rejection::JsonRejection, Path, RawQuery};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use prometheus::Encoder;
use serde_derive::Serialize;

use query_engine_execution::query::Row;
use query_engine_translation::translation::item::Body;
use query_engine_translation::translation::query::QuerySpec;

use crate::error::{ListError, ServerError};
use crate::health;
use crate::query;
use crate::state::State;

type ServerState = extract::State<Arc<State>>;

/// The response envelope of every resource endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub errors: Vec<String>,
}

impl<T> Envelope<T> {
    fn data(data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            data,
            errors: vec![],
        })
    }
}

/// Create a router serving every resource of the state.
pub fn create_router(state: State) -> Router {
    Router::new()
        .route("/healthcheck", get(get_health))
        .route("/metrics", get(get_metrics))
        .route("/:resource", get(list_items).post(create_item))
        .route(
            "/:resource/:lookup",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(Arc::new(state))
}

async fn get_health(extract::State(state): ServerState) -> Result<&'static str, ServerError> {
    health::health_check(&state).await?;
    Ok("Ok")
}

async fn get_metrics(extract::State(state): ServerState) -> Result<impl IntoResponse, ServerError> {
    state.executor.update_metrics(&state.metrics);

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder
        .encode(&state.metrics_registry.gather(), &mut buffer)
        .map_err(|err| ServerError::Internal(err.to_string()))?;
    let body = String::from_utf8(buffer).map_err(|err| ServerError::Internal(err.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    ))
}

async fn list_items(
    extract::State(state): ServerState,
    Path(resource): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Envelope<Vec<Row>>>, ListError> {
    let spec = QuerySpec::parse(raw_query.as_deref().unwrap_or_default());
    let rows = query::list(&state, &resource, spec).await?;
    Ok(Envelope::data(rows))
}

async fn get_item(
    extract::State(state): ServerState,
    Path((resource, lookup)): Path<(String, String)>,
) -> Result<Json<Envelope<Row>>, ServerError> {
    let row = query::get(&state, &resource, &lookup).await?;
    Ok(Envelope::data(row))
}

async fn create_item(
    extract::State(state): ServerState,
    Path(resource): Path<String>,
    body: Result<Json<Body>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Row>>), ServerError> {
    let Json(body) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    let row = query::create(&state, &resource, body).await?;
    Ok((StatusCode::CREATED, Envelope::data(row)))
}

async fn update_item(
    extract::State(state): ServerState,
    Path((resource, lookup)): Path<(String, String)>,
    body: Result<Json<Body>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(body) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    query::update(&state, &resource, &lookup, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_item(
    extract::State(state): ServerState,
    Path((resource, lookup)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    query::delete(&state, &resource, &lookup).await?;
    Ok(StatusCode::NO_CONTENT)
}
