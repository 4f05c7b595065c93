use std::str::FromStr;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::live::LiveHub;
use crate::live::client::LiveHandle;
use crate::model::envelope::Envelope;
use crate::model::live::Topic;
use actix_web::{HttpResponse, web};

fn handle<'a>(hub: &'a LiveHub, raw: &str) -> Result<&'a LiveHandle, ApiError> {
    Topic::from_str(raw)
        .ok()
        .and_then(|topic| hub.get(topic))
        .ok_or_else(|| ApiError::NotFound(format!("Unknown live topic '{raw}'")))
}

/// Connection state and recent traffic of every live feed
#[utoipa::path(
    get,
    path = "/api/live",
    responses(
        (status = 200, description = "One snapshot per topic", body = [LiveSnapshot]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Live"
)]
pub async fn list_live(_auth: AuthUser, hub: web::Data<LiveHub>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(Envelope::ok(hub.snapshots())))
}

#[utoipa::path(
    get,
    path = "/api/live/{topic}",
    params(
        ("topic" = Topic, Path, description = "attendance | employee | invoice | stock")
    ),
    responses(
        (status = 200, description = "Snapshot of one feed", body = LiveSnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown topic")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Live"
)]
pub async fn get_live(
    _auth: AuthUser,
    path: web::Path<String>,
    hub: web::Data<LiveHub>,
) -> Result<HttpResponse, ApiError> {
    let client = handle(&hub, &path)?;
    Ok(HttpResponse::Ok().json(Envelope::ok(client.snapshot())))
}

/// Manual reconnect
///
/// Resets the attempt counter and clears a stopped auto-retry, like the
/// dashboard's "reconnect" button.
#[utoipa::path(
    post,
    path = "/api/live/{topic}/reconnect",
    params(
        ("topic" = Topic, Path, description = "attendance | employee | invoice | stock")
    ),
    responses(
        (status = 202, description = "Reconnect requested"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown topic")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Live"
)]
pub async fn reconnect_live(
    auth: AuthUser,
    path: web::Path<String>,
    hub: web::Data<LiveHub>,
) -> Result<HttpResponse, ApiError> {
    let client = handle(&hub, &path)?;
    client.reconnect().map_err(|e| {
        tracing::error!(error = %e, "Reconnect request failed");
        ApiError::Internal(e.to_string())
    })?;

    tracing::info!(user_id = %auth.user_id, topic = %client.topic(), "Manual live reconnect");

    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "success": true,
        "message": format!("Reconnecting {}", client.topic()),
    })))
}
