use async_trait::async_trait;
use debate_chat::{
    Error, Result,
    history::{Message, MessageStore},
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

/// Parks calls until released, so a request can be observed mid-flight.
#[derive(Debug)]
struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        }
    }

    async fn pass(&self) -> Result<()> {
        self.entered.notify_one();
        self.release
            .acquire()
            .await
            .map_err(|e| Error::internal(e.to_string()))?
            .forget();
        Ok(())
    }
}

/// In-memory store that records calls and fails on demand.
#[derive(Debug, Default)]
pub struct MockMessageStore {
    pub rows: Mutex<Vec<Message>>,
    pub list_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_human_insert: AtomicBool,
    pub fail_bot_insert: AtomicBool,
    insert_gate: Option<Gate>,
    list_gate: Option<Gate>,
}

impl MockMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: Vec<Message>) -> Self {
        *self.rows.lock().unwrap() = rows;
        self
    }

    pub fn with_insert_gate(mut self) -> Self {
        self.insert_gate = Some(Gate::new());
        self
    }

    pub fn with_list_gate(mut self) -> Self {
        self.list_gate = Some(Gate::new());
        self
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_human_insert(&self, fail: bool) {
        self.fail_human_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_bot_insert(&self, fail: bool) {
        self.fail_bot_insert.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<Message> {
        self.rows.lock().unwrap().clone()
    }

    /// Resolves once an insert is parked on the gate.
    pub async fn wait_for_insert(&self) {
        if let Some(gate) = &self.insert_gate {
            gate.entered.notified().await;
        }
    }

    pub fn release_inserts(&self) {
        if let Some(gate) = &self.insert_gate {
            gate.release.add_permits(1024);
        }
    }

    /// Resolves once a list call is parked on the gate.
    pub async fn wait_for_list(&self) {
        if let Some(gate) = &self.list_gate {
            gate.entered.notified().await;
        }
    }

    /// Lets `count` parked or future list calls through.
    pub fn release_lists(&self, count: usize) {
        if let Some(gate) = &self.list_gate {
            gate.release.add_permits(count);
        }
    }
}

#[async_trait]
impl MessageStore for MockMessageStore {
    async fn list(&self) -> Result<Vec<Message>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some(gate) = &self.list_gate {
            gate.pass().await?;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::store(500, "mock list failure"));
        }

        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn insert(&self, message: &Message) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some(gate) = &self.insert_gate {
            gate.pass().await?;
        }

        let fail = if message.is_bot {
            self.fail_bot_insert.load(Ordering::SeqCst)
        } else {
            self.fail_human_insert.load(Ordering::SeqCst)
        };
        if fail {
            return Err(Error::store(500, "mock insert failure"));
        }

        let mut stored = message.clone();
        let mut rows = self.rows.lock().unwrap();
        stored.id = Some(rows.len() as i64 + 1);
        rows.push(stored);
        Ok(())
    }
}
