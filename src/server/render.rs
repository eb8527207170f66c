use crate::chat::SessionSnapshot;

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f4f5f7; margin: 0; }
.app-container { max-width: 640px; margin: 2rem auto; }
.app-title { text-align: center; }
.chat-container { background: #fff; border-radius: 8px; padding: 1rem; }
.error-message { background: #fdecea; color: #b71c1c; padding: .5rem; margin-bottom: .5rem; }
.messages-container { min-height: 300px; display: flex; flex-direction: column; gap: .5rem; }
.message { max-width: 75%; padding: .5rem .75rem; border-radius: 12px; }
.user-message { align-self: flex-end; background: #1976d2; color: #fff; }
.bot-message { align-self: flex-start; background: #e0e0e0; }
.loading, .empty-message { color: #777; text-align: center; margin-top: 2rem; }
.message-input-form { display: flex; gap: .5rem; margin-top: 1rem; }
.message-input-form input { flex: 1; padding: .5rem; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the whole chat page from a session snapshot.
pub fn page(title: &str, snapshot: &SessionSnapshot) -> String {
    let title = escape_html(title);
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body>"
    ));
    html.push_str(&format!(
        "<div class=\"app-container\"><h1 class=\"app-title\">{title}</h1><div class=\"chat-container\">"
    ));

    if let Some(error) = &snapshot.error {
        html.push_str(&format!(
            "<div class=\"error-message\">{}</div>",
            escape_html(error)
        ));
    }

    html.push_str("<div class=\"messages-container\">");
    if snapshot.pending && snapshot.messages.is_empty() {
        html.push_str("<div class=\"loading\">Loading messages...</div>");
    } else if snapshot.messages.is_empty() {
        html.push_str("<div class=\"empty-message\">Start the conversation!</div>");
    } else {
        for message in &snapshot.messages {
            let class = if message.is_bot {
                "bot-message"
            } else {
                "user-message"
            };
            html.push_str(&format!(
                "<div class=\"message {class}\"><div class=\"message-content\">{}</div></div>",
                escape_html(&message.content)
            ));
        }
    }
    html.push_str("</div>");

    let input_disabled = if snapshot.pending { " disabled" } else { "" };
    let button_disabled = if snapshot.can_submit { "" } else { " disabled" };
    let button_label = if snapshot.pending { "Sending..." } else { "Send" };
    html.push_str(&format!(
        concat!(
            "<form class=\"message-input-form\" method=\"post\" action=\"/send\">",
            "<input type=\"text\" name=\"content\" value=\"{value}\" placeholder=\"Type a message...\" ",
            "autocomplete=\"off\" oninput=\"this.form.querySelector('button').disabled = !this.value.trim()\"{input_disabled}>",
            "<button type=\"submit\"{button_disabled}>{button_label}</button>",
            "</form>"
        ),
        value = escape_html(&snapshot.input),
        input_disabled = input_disabled,
        button_disabled = button_disabled,
        button_label = button_label,
    ));

    html.push_str("</div></div></body></html>");
    html
}
