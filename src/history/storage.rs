use super::{Message, NewMessage};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use libsql::{Builder, Connection, Database};
use tracing::{debug, info};

/// Table-shaped backing store for chat messages.
///
/// Rows are append-only: there is no update or delete.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All rows, ascending by `created_at`.
    async fn list(&self) -> Result<Vec<Message>>;

    async fn insert(&self, message: &Message) -> Result<()>;
}

/// libSQL-backed store used for local development and tests.
pub struct LibsqlMessageStore {
    _db: Database,
    // A single connection keeps `:memory:` databases alive across calls.
    conn: Connection,
    table: String,
}

impl LibsqlMessageStore {
    pub async fn new(db_path: &str, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let db = Builder::new_local(db_path).build().await?;

        let conn = db.connect()?;
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    content TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    is_bot INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                )
                "#
            ),
            (),
        )
        .await?;

        info!("Database initialized successfully: {} ({})", db_path, table);

        Ok(Self {
            _db: db,
            conn,
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl MessageStore for LibsqlMessageStore {
    async fn list(&self) -> Result<Vec<Message>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT id, content, user_id, is_bot, created_at FROM {} ORDER BY created_at ASC, id ASC",
                    self.table
                ),
                (),
            )
            .await?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at_str: String = row.get(4)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
                .with_timezone(&chrono::Utc);
            let is_bot: i64 = row.get(3)?;

            messages.push(Message {
                id: Some(row.get(0)?),
                content: row.get(1)?,
                user_id: row.get(2)?,
                is_bot: is_bot != 0,
                created_at,
            });
        }

        debug!("Retrieved {} messages from {}", messages.len(), self.table);
        Ok(messages)
    }

    async fn insert(&self, message: &Message) -> Result<()> {
        let row = NewMessage::from(message);
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (content, user_id, is_bot, created_at) VALUES (?, ?, ?, ?)",
                    self.table
                ),
                (
                    row.content,
                    row.user_id,
                    i64::from(row.is_bot),
                    // Fixed-width timestamps keep lexical and chronological order aligned.
                    row.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            )
            .await?;

        debug!("Message saved to {}: {}", self.table, row.user_id);
        Ok(())
    }
}

/// Table names are interpolated into SQL and URLs, so only plain identifiers pass.
pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(Error::config(format!("Invalid table name: '{table}'")))
    }
}
