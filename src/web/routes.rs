use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::pages;
use super::AppState;
use crate::db::{
    append_log_best_effort, get_allowed_role, insert_topic, list_active_topics, set_allowed_role,
    soft_delete_topic, AuditAction, NewAuditLog, NewTopic,
};
use crate::links::{is_absolute_http_url, sanitize_image_url};

/// Create the router with all routes.
pub fn router(state: &AppState) -> Router<AppState> {
    let internal = Router::new()
        .route("/internal/topic.create", post(create_topic))
        .route("/internal/topic.remove", post(remove_topic))
        .route("/internal/config.setRole", post(set_role))
        .route("/internal/config.get", get(get_config))
        .route("/internal/config.getRole", get(get_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_internal_auth,
        ));

    Router::new()
        .route("/", get(home))
        .route("/public/topics", get(public_topics))
        .route("/health", get(health))
        .merge(internal)
}

// ========== Wire types ==========

#[derive(Debug, Deserialize)]
struct ActorBody {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTopicBody {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    actor: Option<ActorBody>,
}

#[derive(Debug, Deserialize)]
struct RemoveTopicBody {
    id: Option<i64>,
    actor: Option<ActorBody>,
}

#[derive(Debug, Deserialize)]
struct SetRoleBody {
    #[serde(rename = "roleId")]
    role_id: Option<String>,
    actor: Option<ActorBody>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            ok: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn server_error() -> Response {
    // The specific cause is logged server-side, never leaked to the caller.
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "server_error")
}

// ========== Middleware ==========

/// Optional bearer-token guard for the internal endpoints.
///
/// When `API_AUTH_TOKEN` is unset the internal surface is open and network
/// isolation is the only boundary.
async fn require_internal_auth(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_auth_token.as_deref() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected);

    if authorized {
        next.run(request).await
    } else {
        error_response(StatusCode::UNAUTHORIZED, "unauthorized")
    }
}

// ========== Public routes ==========

async fn home(State(state): State<AppState>) -> Response {
    let topics = match list_active_topics(state.db.pool()).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to fetch topics for listing page: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    Html(pages::render_home(&topics).into_string()).into_response()
}

async fn public_topics(State(state): State<AppState>) -> Response {
    match list_active_topics(state.db.pool()).await {
        Ok(items) => Json(json!({ "ok": true, "items": items })).into_response(),
        Err(e) => {
            tracing::error!("Failed to list topics: {e:#}");
            server_error()
        }
    }
}

async fn health() -> Response {
    Json(json!({ "ok": true })).into_response()
}

// ========== Internal routes ==========

async fn create_topic(
    State(state): State<AppState>,
    Json(body): Json<CreateTopicBody>,
) -> Response {
    // Required fields first, then URL syntax. A bad image URL is degraded,
    // never rejected.
    let title = body.title.as_deref().unwrap_or("").trim();
    let url = body.url.as_deref().unwrap_or("").trim();
    let (actor_id, actor_tag) = match body.actor {
        Some(ActorBody {
            user_id: Some(ref id),
            tag: Some(ref tag),
        }) if !id.is_empty() && !tag.is_empty() => (id.clone(), tag.clone()),
        _ => return error_response(StatusCode::BAD_REQUEST, "missing_fields"),
    };

    if title.is_empty() || url.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    }

    if !is_absolute_http_url(url) {
        return error_response(StatusCode::BAD_REQUEST, "invalid_url");
    }

    let new_topic = NewTopic {
        title: title.to_string(),
        url: url.to_string(),
        description: body.description.unwrap_or_default(),
        image_url: sanitize_image_url(body.image_url.as_deref()),
        created_by_user_id: actor_id.clone(),
        created_by_tag: actor_tag.clone(),
    };

    let topic_id = match insert_topic(state.db.pool(), &new_topic).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create topic: {e:#}");
            return server_error();
        }
    };

    append_log_best_effort(
        state.db.pool(),
        &NewAuditLog {
            action: AuditAction::TopicCreate,
            topic_id: Some(topic_id),
            actor_user_id: actor_id,
            actor_tag,
            detail: json!({ "title": new_topic.title, "url": new_topic.url }),
        },
    )
    .await;

    Json(json!({ "ok": true, "topicId": topic_id })).into_response()
}

async fn remove_topic(
    State(state): State<AppState>,
    Json(body): Json<RemoveTopicBody>,
) -> Response {
    let (Some(id), Some(actor)) = (body.id, body.actor) else {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    };
    let Some(actor_id) = actor.user_id.filter(|s| !s.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    };

    let removed = match soft_delete_topic(state.db.pool(), id).await {
        Ok(removed) => removed,
        Err(e) => {
            tracing::error!(topic_id = id, "Failed to remove topic: {e:#}");
            return server_error();
        }
    };

    append_log_best_effort(
        state.db.pool(),
        &NewAuditLog {
            action: AuditAction::TopicRemove,
            topic_id: Some(id),
            actor_user_id: actor_id,
            actor_tag: actor.tag.unwrap_or_default(),
            detail: json!({ "removed": removed }),
        },
    )
    .await;

    Json(json!({ "ok": true, "removed": removed })).into_response()
}

async fn set_role(State(state): State<AppState>, Json(body): Json<SetRoleBody>) -> Response {
    let Some(role_id) = body.role_id.filter(|s| !s.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    };
    let Some(actor) = body.actor else {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    };
    let Some(actor_id) = actor.user_id.filter(|s| !s.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "missing_fields");
    };

    if let Err(e) = set_allowed_role(state.db.pool(), &role_id).await {
        tracing::error!("Failed to set allowed role: {e:#}");
        return server_error();
    }

    append_log_best_effort(
        state.db.pool(),
        &NewAuditLog {
            action: AuditAction::ConfigSetRole,
            topic_id: None,
            actor_user_id: actor_id,
            actor_tag: actor.tag.unwrap_or_default(),
            detail: json!({ "roleId": role_id }),
        },
    )
    .await;

    Json(json!({ "ok": true })).into_response()
}

async fn get_config(State(state): State<AppState>) -> Response {
    match get_allowed_role(state.db.pool()).await {
        Ok(role) => Json(json!({ "allowed_role_id": role })).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch config: {e:#}");
            server_error()
        }
    }
}

async fn get_role(State(state): State<AppState>) -> Response {
    match get_allowed_role(state.db.pool()).await {
        Ok(role) => Json(json!({ "ok": true, "roleId": role })).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch allowed role: {e:#}");
            server_error()
        }
    }
}
