use super::mocks::MockMessageStore;
use chrono::{Duration, Utc};
use debate_chat::{
    Result,
    chat::ChatSession,
    config::{ChatConfig, Config, LogsConfig, ServerConfig, StoreBackend, StoreConfig},
    history::{LibsqlMessageStore, Message},
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration backed by an in-memory local store
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        store: StoreConfig {
            backend: StoreBackend::Local,
            url: String::new(),
            api_key: String::new(),
            table: "messages".to_string(),
            database_path: ":memory:".to_string(),
        },
        chat: ChatConfig::default(),
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> Result<String> {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await?;
    Ok(config_path.to_string_lossy().to_string())
}

/// Create a file-backed store in a temporary directory
pub async fn create_test_db() -> Result<(TempDir, LibsqlMessageStore)> {
    let temp_dir = create_temp_dir();
    let db_path = temp_dir.path().join("test.db");
    let storage = LibsqlMessageStore::new(&db_path.to_string_lossy(), "messages").await?;
    Ok((temp_dir, storage))
}

/// Session over a mock store, returning both handles
pub fn session_with(store: MockMessageStore) -> (Arc<MockMessageStore>, ChatSession) {
    let store = Arc::new(store);
    let session = ChatSession::new(store.clone(), ChatConfig::default());
    (store, session)
}

/// `count` alternating human/bot rows, one second apart
pub fn sample_history(count: usize) -> Vec<Message> {
    let start = Utc::now() - Duration::minutes(10);
    (0..count)
        .map(|i| {
            let mut msg = if i % 2 == 0 {
                Message::human("user123".to_string(), format!("question {i}"))
            } else {
                Message::bot("bot".to_string(), format!("answer {i}"))
            };
            msg.created_at = start + Duration::seconds(i as i64);
            msg.id = Some(i as i64 + 1);
            msg
        })
        .collect()
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 8080
  logs:
    level: "debug"

store:
  backend: "rest"
  url: "https://example.supabase.co"
  api_key: "anon-key"
  table: "messages"

chat:
  title: "Debate Chatbot"
  user_id: "user123"
  bot_id: "bot"
  reply_template: "Response to your message: {message}"
"#;

/// Sample configuration using the local store
pub const SAMPLE_LOCAL_CONFIG_YAML: &str = r#"
store:
  backend: "local"
  database_path: ":memory:"
"#;
