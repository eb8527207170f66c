use crate::{Error, Result};
use tracing::{debug, warn};

// Send cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    Reloading,
    BotReplying,
    ReplyReloading,
    Done,
    Failed,
}

// Send cycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendEvent {
    Submitted,
    HumanInserted,
    HumanInsertFailed,
    HistoryLoaded,
    HistoryLoadFailed,
    BotInserted,
    BotInsertFailed,
}

/// Tracks one send: human insert, reload, bot reply, reload.
///
/// A failed reload never aborts the cycle; only insert failures do.
#[derive(Debug)]
pub struct SendCycle {
    state: SendState,
}

impl Default for SendCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl SendCycle {
    pub fn new() -> Self {
        Self {
            state: SendState::Idle,
        }
    }

    pub fn current_state(&self) -> SendState {
        self.state
    }

    pub fn transition(&mut self, event: SendEvent) -> Result<SendState> {
        use SendEvent::*;
        use SendState::*;

        let new_state = match (self.state, event) {
            (Idle, Submitted) => Sending,
            (Sending, HumanInserted) => Reloading,
            (Sending, HumanInsertFailed) => Failed,
            (Reloading, HistoryLoaded | HistoryLoadFailed) => BotReplying,
            (BotReplying, BotInserted) => ReplyReloading,
            (BotReplying, BotInsertFailed) => Failed,
            (ReplyReloading, HistoryLoaded | HistoryLoadFailed) => Done,
            (state, event) => {
                warn!("Invalid send transition from {:?} with event {:?}", state, event);
                return Err(Error::InvalidTransition {
                    current: format!("{state:?}"),
                    requested: format!("{event:?}"),
                });
            }
        };

        debug!(
            "Send cycle: {:?} -> {:?} (event: {:?})",
            self.state, new_state, event
        );
        self.state = new_state;
        Ok(new_state)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SendState::Done | SendState::Failed)
    }
}
