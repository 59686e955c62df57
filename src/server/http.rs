use crate::app::dto::*;
use crate::app::engine::MatchEngine;
use crate::domain::error::NotFound;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct HttpState {
    pub engine: MatchEngine,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ApiErrorBody { error: msg.into() })).into_response()
}

/// Unknown labels are 404; everything else the engine rejects is a bad request.
fn engine_error(err: anyhow::Error) -> Response {
    let status = if err.downcast_ref::<NotFound>().is_some() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    api_error(status, format!("{err:#}"))
}

/// Run an engine call off the async runtime; the engine takes blocking locks.
async fn run_blocking<T, F>(call: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match spawn_blocking(call).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => engine_error(e),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("task join error: {e}")),
    }
}

pub fn build_router(engine: MatchEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/match", post(match_all))
        .route("/match-first", post(match_first))
        .route("/commands", post(commands))
        .route("/upstream", post(upstream))
        .route("/reload", post(reload))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: MatchEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> Response {
    match state.engine.health() {
        Ok(res) => Json(res).into_response(),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn reload(State(state): State<Arc<HttpState>>) -> Response {
    let engine = state.engine.clone();
    run_blocking(move || engine.reload()).await
}

async fn match_all(State(state): State<Arc<HttpState>>, Json(req): Json<MatchRequest>) -> Response {
    let engine = state.engine.clone();
    run_blocking(move || engine.match_all(req)).await
}

async fn match_first(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<MatchRequest>,
) -> Response {
    let engine = state.engine.clone();
    run_blocking(move || engine.match_first(req)).await
}

async fn commands(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<CommandsRequest>,
) -> Response {
    let engine = state.engine.clone();
    run_blocking(move || engine.post_commands(req)).await
}

async fn upstream(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<UpstreamRequest>,
) -> Response {
    let engine = state.engine.clone();
    run_blocking(move || engine.upstream(req)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EngineConfig;
    use crate::domain::description::{PortDescription, SignalDescription, SystemDescription};
    use crate::domain::ids::EntityId;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn engine() -> MatchEngine {
        let signal = |label: &str| SignalDescription {
            label: label.into(),
            properties: Vec::new(),
            held: false,
        };
        let description = SystemDescription {
            signals: vec![signal("x"), signal("y")],
            ports: vec![PortDescription {
                entity: EntityId::from("Std.Negate"),
                architecture: None,
                inputs: vec![Some("x".into())],
                outputs: vec![Some("y".into())],
                buses: Vec::new(),
            }],
            ..SystemDescription::default()
        };
        MatchEngine::from_description(&description, EngineConfig::default()).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_http_health_and_commands() {
        let app = build_router(engine());

        let res = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["signal_count"], 2);

        let body = serde_json::json!({
            "commands": [
                {"command": "new_signal", "label": "z"},
                {"command": "remove_signal", "signal": {"index": 9}}
            ]
        });
        let res = app.oneshot(post("/commands", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["executed"].as_array().unwrap().len(), 1);
        assert_eq!(body["aborted"][0]["command"], "remove_signal");
    }

    #[tokio::test]
    async fn test_unknown_signal_is_not_found() {
        let app = build_router(engine());
        let res = app
            .oneshot(post("/match", serde_json::json!({"signal": "nope"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
