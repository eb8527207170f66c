use crate::chat::{SendOutcome, SessionSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub outcome: SendOutcome,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
