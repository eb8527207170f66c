use serde::{Deserialize, Serialize};

pub const MESSAGE_PLACEHOLDER: &str = "{message}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the hosted project, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Rest,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_bot_id")]
    pub bot_id: String,
    /// Bot reply text; `{message}` is replaced with the user's text.
    #[serde(default = "default_reply_template")]
    pub reply_template: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            user_id: default_user_id(),
            bot_id: default_bot_id(),
            reply_template: default_reply_template(),
        }
    }
}

impl ChatConfig {
    pub fn render_reply(&self, user_text: &str) -> String {
        self.reply_template.replace(MESSAGE_PLACEHOLDER, user_text)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_table() -> String {
    "messages".to_string()
}

fn default_database_path() -> String {
    "chat.db".to_string()
}

fn default_title() -> String {
    "Debate Chatbot".to_string()
}

fn default_user_id() -> String {
    "user123".to_string()
}

fn default_bot_id() -> String {
    "bot".to_string()
}

fn default_reply_template() -> String {
    "Response to your message: {message}".to_string()
}
