use super::{
    render,
    types::{ErrorResponse, HealthResponse, SendRequest, SendResponse},
};
use crate::chat::{ChatSession, SendOutcome, SessionSnapshot, SkipReason};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Json, Redirect},
};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
}

fn outcome_status(outcome: SendOutcome) -> StatusCode {
    match outcome {
        SendOutcome::Delivered => StatusCode::OK,
        SendOutcome::Skipped {
            reason: SkipReason::Pending,
        } => StatusCode::CONFLICT,
        SendOutcome::Skipped {
            reason: SkipReason::EmptyInput,
        } => StatusCode::UNPROCESSABLE_ENTITY,
        SendOutcome::InsertFailed | SendOutcome::ReplyFailed => StatusCode::BAD_GATEWAY,
    }
}

/// Runs the send cycle on its own task so a client disconnect cannot stop it
/// between the human insert and the bot reply.
async fn submit_detached(
    session: &Arc<ChatSession>,
    content: String,
) -> std::result::Result<SendOutcome, JoinError> {
    let session = Arc::clone(session);
    tokio::spawn(async move { session.submit(&content).await }).await
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.session.snapshot();
    Html(render::page(&state.session.chat_config().title, &snapshot))
}

pub async fn send_form(
    State(state): State<AppState>,
    Form(request): Form<SendRequest>,
) -> Redirect {
    match submit_detached(&state.session, request.content).await {
        Ok(outcome) => info!("Form submission finished: {:?}", outcome),
        Err(e) => error!("Send task failed: {}", e),
    }
    Redirect::to("/")
}

pub async fn list_messages(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<(StatusCode, Json<SendResponse>), (StatusCode, Json<ErrorResponse>)> {
    let outcome = submit_detached(&state.session, request.content)
        .await
        .map_err(|e| {
            error!("Send task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Send task failed: {}", e),
                }),
            )
        })?;
    info!("Message submission finished: {:?}", outcome);

    Ok((
        outcome_status(outcome),
        Json(SendResponse {
            outcome,
            session: state.session.snapshot(),
        }),
    ))
}

pub async fn reload(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let status = if state.session.load_history().await {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(state.session.snapshot()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
