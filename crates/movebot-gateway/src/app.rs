use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::error;

use movebot_core::types::{GeoPoint, InputMediaItem, Provider, ProviderEvent};

use crate::ingress::{Ingress, IngressError};

/// Shared state for the HTTP surface.
pub struct AppState {
    pub ingress: Arc<Ingress>,
}

/// Provider-normalized webhook body; the provider itself comes from the path.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    pub provider_account_id: String,
    pub chat_id: String,
    pub message_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub button_payload: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub media: Vec<InputMediaItem>,
}

#[derive(Debug, Serialize)]
struct WebhookResponse {
    reply: String,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/{provider}", post(handle_webhook))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Json(body): Json<WebhookBody>,
) -> Response {
    let Ok(provider) = Provider::from_str(&provider) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let event = ProviderEvent {
        provider,
        provider_account_id: body.provider_account_id,
        chat_id: body.chat_id,
        message_id: body.message_id,
        text: body.text,
        button_payload: body.button_payload,
        location: body.location,
        media: body.media,
    };

    // The engine step itself is synchronous and brief; run it on a blocking
    // thread so store I/O never stalls the async executor.
    let ingress = state.ingress.clone();
    let result =
        tokio::task::spawn_blocking(move || ingress.process(&event)).await;

    match result {
        Ok(Ok(reply)) => Json(WebhookResponse { reply: reply.text }).into_response(),
        Ok(Err(e)) => ingress_error_response(e),
        Err(join_err) => {
            error!("ingress task panicked: {join_err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Failing the request without acking means the provider retries; the dedup
/// table short-circuits whatever already committed.
fn ingress_error_response(e: IngressError) -> Response {
    match e {
        IngressError::UnknownBinding => StatusCode::NOT_FOUND.into_response(),
        IngressError::TenantRejected | IngressError::BotDisabled => {
            StatusCode::FORBIDDEN.into_response()
        }
        IngressError::Conflict => {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        IngressError::Store(msg) => {
            error!("ingress store failure: {msg}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
