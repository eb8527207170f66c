use super::{Message, MessageStore, NewMessage, storage::validate_table_name};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Deserializer, de};
use tracing::{debug, warn};

/// Hosted table behind a PostgREST-style endpoint (`/rest/v1/<table>`).
pub struct RestMessageStore {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

/// Row as returned by the service. Hosted tables may use non-integer ids,
/// so the id is read loosely.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    id: Option<serde_json::Value>,
    content: String,
    user_id: String,
    #[serde(default)]
    is_bot: Option<bool>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 and offset-less `timestamp` columns, read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl From<Row> for Message {
    fn from(row: Row) -> Self {
        Self {
            id: row.id.and_then(|v| v.as_i64()),
            content: row.content,
            user_id: row.user_id,
            is_bot: row.is_bot.unwrap_or(false),
            created_at: row.created_at,
        }
    }
}

impl RestMessageStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::config("REST store requires a base URL"));
        }

        debug!("Creating REST message store for table: {}", table);

        Ok(Self {
            endpoint: format!("{base_url}/rest/v1/{table}"),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("REST store returned {}: {}", status, body);
        Err(Error::store(status.as_u16(), body))
    }
}

#[async_trait]
impl MessageStore for RestMessageStore {
    async fn list(&self) -> Result<Vec<Message>> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "created_at.asc")]);

        let response = Self::check(self.authorize(request).send().await?).await?;
        let body = response.text().await?;
        let rows: Vec<Row> = serde_json::from_str(&body)?;

        debug!("Retrieved {} messages from REST store", rows.len());
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn insert(&self, message: &Message) -> Result<()> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=minimal")
            .json(&[NewMessage::from(message)]);

        Self::check(self.authorize(request).send().await?).await?;

        debug!("Message inserted via REST store: {}", message.user_id);
        Ok(())
    }
}
