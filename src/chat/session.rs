use super::fsm::{SendCycle, SendEvent};
use crate::{
    config::ChatConfig,
    history::{Message, MessageStore},
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

pub const LOAD_ERROR: &str =
    "Failed to load messages. Check that the messages table is set up correctly.";
pub const SEND_ERROR: &str = "Failed to send the message.";
pub const REPLY_ERROR: &str = "Failed to generate the bot reply.";

/// Everything the presentation layer needs to draw the chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub error: Option<String>,
    pub input: String,
    pub can_submit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyInput,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Guard rejected the send; nothing was written.
    Skipped { reason: SkipReason },
    InsertFailed,
    /// Human message stored, bot reply failed.
    ReplyFailed,
    Delivered,
}

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<Message>,
    error: Option<String>,
    input: String,
    sending: bool,
    loading: usize,
}

impl SessionState {
    fn pending(&self) -> bool {
        self.sending || self.loading > 0
    }
}

#[derive(Clone, Copy)]
enum PendingKind {
    Send,
    Load,
}

/// Clears its share of the pending flag when dropped, including when the
/// owning future is cancelled mid-request.
struct PendingGuard<'a> {
    session: &'a ChatSession,
    kind: PendingKind,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        match self.kind {
            PendingKind::Send => state.sending = false,
            PendingKind::Load => state.loading = state.loading.saturating_sub(1),
        }
    }
}

/// Chat session controller.
///
/// Every write is followed by a full reload; the visible history is always
/// the last list reported by the store. State sits behind a mutex that is
/// never held across an await, so the pending check-and-set is atomic and
/// at most one send is in flight.
pub struct ChatSession {
    store: Arc<dyn MessageStore>,
    chat: ChatConfig,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn new(store: Arc<dyn MessageStore>, chat: ChatConfig) -> Self {
        Self {
            store,
            chat,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn chat_config(&self) -> &ChatConfig {
        &self.chat
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        let pending = state.pending();
        SessionSnapshot {
            messages: state.messages.clone(),
            pending,
            error: state.error.clone(),
            input: state.input.clone(),
            can_submit: !pending && !state.input.trim().is_empty(),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state().pending()
    }

    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Replaces the input buffer. Ignored while a request is pending, the
    /// same way a disabled input box ignores typing.
    pub fn set_input(&self, text: impl Into<String>) -> bool {
        let mut state = self.state();
        if state.pending() {
            return false;
        }
        state.input = text.into();
        true
    }

    /// Fetches the full history and replaces the visible list.
    pub async fn load_history(&self) -> bool {
        let _guard = self.enter_load();
        self.reload().await
    }

    /// Sends whatever is in the input buffer.
    pub async fn send(&self) -> SendOutcome {
        match self.begin_send(None) {
            Ok((text, guard)) => self.run_send(text, guard).await,
            Err(reason) => SendOutcome::Skipped { reason },
        }
    }

    /// Writes `text` into the input buffer and sends it in one step, so a
    /// concurrent caller cannot swap the buffer between the two.
    pub async fn submit(&self, text: &str) -> SendOutcome {
        match self.begin_send(Some(text)) {
            Ok((text, guard)) => self.run_send(text, guard).await,
            Err(reason) => SendOutcome::Skipped { reason },
        }
    }

    fn enter_load(&self) -> PendingGuard<'_> {
        self.state().loading += 1;
        PendingGuard {
            session: self,
            kind: PendingKind::Load,
        }
    }

    fn begin_send(
        &self,
        text: Option<&str>,
    ) -> std::result::Result<(String, PendingGuard<'_>), SkipReason> {
        let mut state = self.state();

        let text = match text {
            Some(text) => text.to_string(),
            None => state.input.clone(),
        };
        if text.trim().is_empty() {
            debug!("Ignoring send of empty input");
            return Err(SkipReason::EmptyInput);
        }
        if state.pending() {
            warn!("Ignoring send while another request is pending");
            return Err(SkipReason::Pending);
        }

        state.input = text.clone();
        state.sending = true;
        drop(state);

        Ok((
            text,
            PendingGuard {
                session: self,
                kind: PendingKind::Send,
            },
        ))
    }

    async fn run_send(&self, text: String, _guard: PendingGuard<'_>) -> SendOutcome {
        let mut cycle = SendCycle::new();
        advance(&mut cycle, SendEvent::Submitted);

        let message = Message::human(self.chat.user_id.clone(), text);
        if let Err(e) = self.store.insert(&message).await {
            error!("Failed to send message: {}", e);
            self.state().error = Some(SEND_ERROR.to_string());
            advance(&mut cycle, SendEvent::HumanInsertFailed);
            return SendOutcome::InsertFailed;
        }
        advance(&mut cycle, SendEvent::HumanInserted);
        self.state().input.clear();

        let loaded = self.reload().await;
        advance(&mut cycle, reload_event(loaded));

        if !self.generate_bot_reply(&message, &mut cycle).await {
            return SendOutcome::ReplyFailed;
        }

        info!("Send cycle finished in {:?}", cycle.current_state());
        SendOutcome::Delivered
    }

    /// Stores the templated echo of `human`, then reloads. A failure here
    /// leaves the human message in place.
    async fn generate_bot_reply(&self, human: &Message, cycle: &mut SendCycle) -> bool {
        let reply = Message::bot(
            self.chat.bot_id.clone(),
            self.chat.render_reply(&human.content),
        )
        .not_before(human.created_at);

        if let Err(e) = self.store.insert(&reply).await {
            error!("Failed to generate bot reply: {}", e);
            self.state().error = Some(REPLY_ERROR.to_string());
            advance(cycle, SendEvent::BotInsertFailed);
            return false;
        }
        advance(cycle, SendEvent::BotInserted);

        let loaded = self.reload().await;
        advance(cycle, reload_event(loaded));
        true
    }

    async fn reload(&self) -> bool {
        match self.store.list().await {
            Ok(messages) => {
                debug!("Loaded {} messages", messages.len());
                let mut state = self.state();
                state.messages = messages;
                state.error = None;
                true
            }
            Err(e) => {
                error!("Failed to load messages: {}", e);
                self.state().error = Some(LOAD_ERROR.to_string());
                false
            }
        }
    }
}

fn reload_event(loaded: bool) -> SendEvent {
    if loaded {
        SendEvent::HistoryLoaded
    } else {
        SendEvent::HistoryLoadFailed
    }
}

fn advance(cycle: &mut SendCycle, event: SendEvent) {
    if let Err(e) = cycle.transition(event) {
        error!("Send cycle out of order: {}", e);
    }
}
