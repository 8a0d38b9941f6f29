use std::{convert::Infallible, sync::Arc};

use axum::{
    Router,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use crates::{
    domain::value_objects::{enums::user_roles::UserRole, realtime::Room},
    infra::realtime::room_hub::RoomHub,
};
use futures_util::{Stream, stream};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{auth::JwtKeys, axum_http::error_responses::AppError};

#[derive(Clone)]
pub struct RealtimeState {
    room_hub: Arc<RoomHub>,
    jwt_keys: Arc<JwtKeys>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    token: Option<String>,
}

pub fn routes(room_hub: Arc<RoomHub>, jwt_keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .route("/:role/:user_id", get(stream_room))
        .with_state(RealtimeState { room_hub, jwt_keys })
}

/// Streams the events of the caller's own room. Browsers cannot set headers on
/// an `EventSource`, so the session token travels in the query string.
pub async fn stream_room(
    State(state): State<RealtimeState>,
    Path((role, user_id)): Path<(String, Uuid)>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let token = query
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
    let auth = state.jwt_keys.validate(token.trim())?;

    let role = UserRole::from_str(&role)
        .ok_or_else(|| AppError::BadRequest("role must be owner or traveller".to_string()))?;
    if auth.user_id != user_id || auth.role != role {
        warn!(%user_id, caller = %auth.user_id, "realtime: room does not belong to caller");
        return Err(AppError::Forbidden("You can only join your own room".to_string()));
    }

    let room = Room { role, user_id };
    let subscription = state.room_hub.join(room).await;
    info!(%room, "realtime: client joined");

    let events = stream::unfold(subscription, move |mut subscription| async move {
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(err) => {
                            error!(error = ?err, "realtime: failed to serialize event");
                            continue;
                        }
                    };
                    let sse_event = Event::default()
                        .event(event.event_type.as_str())
                        .data(data);
                    return Some((Ok(sse_event), subscription));
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(%room, skipped, "realtime: client lagged");
                }
                Err(RecvError::Closed) => {
                    info!(%room, "realtime: room closed");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
