//! OpenRouter chat proxy for the AttendEase assistant.
//!
//! The assistant is deliberately narrow: a strict system prompt plus
//! few-shot examples keep it on AttendEase topics; everything else is a
//! straight pass-through to the upstream chat-completions API.

use std::time::Duration;

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display)]
pub enum ChatError {
    #[display(fmt = "assistant request failed: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "assistant upstream error ({}): {}", status, body)]
    Upstream { status: u16, body: String },
    #[display(fmt = "assistant returned no answer")]
    EmptyAnswer,
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        ChatError::Transport(e)
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build chat http client");

        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub async fn ask(&self, question: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: prompt_messages(question),
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream { status, body });
        }

        let completion = response.json::<ChatCompletion>().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ChatError::EmptyAnswer)
    }
}

fn prompt_messages(question: &str) -> Vec<ChatMessage> {
    fn msg(role: &'static str, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    vec![
        msg(
            "system",
            "You are AttendEase Assistant.\n\
             Rules:\n\
             - Only answer questions related to AttendEase or its attendance data.\n\
             - Keep answers short, clear, and formal.\n\
             - Use bullet points where possible.\n\
             - If unrelated, respond: 'I can only help with AttendEase-related questions.'",
        ),
        msg("user", "How does AttendEase mark attendance?"),
        msg(
            "assistant",
            "Attendance Process:\n\
             - Verifies the captured face against the enrolled profile\n\
             - Records check-in and check-out times per day\n\
             - Derives Present/Absent/Leave/Holiday per day from the records",
        ),
        msg("user", "How is the attendance report generated?"),
        msg(
            "assistant",
            "Attendance Report:\n\
             - Rebuilt per day from enrollment date to today\n\
             - Approved leave and weekends are excluded from the percentage\n\
             - Exportable as CSV",
        ),
        msg("user", "Hello"),
        msg(
            "assistant",
            "Hello, I am the AttendEase assistant. How can I help you?",
        ),
        msg("user", "Tell me about cricket."),
        msg(
            "assistant",
            "I can only help with AttendEase-related questions.",
        ),
        msg("user", question),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_goes_last_after_the_primer() {
        let messages = prompt_messages("What is my attendance percent?");
        assert_eq!(messages.first().unwrap().role, "system");
        let last = messages.last().unwrap();
        assert_eq!(last.role, "user");
        assert_eq!(last.content, "What is my attendance percent?");
    }

    #[test]
    fn primer_alternates_user_and_assistant() {
        let messages = prompt_messages("q");
        for pair in messages[1..].chunks(2) {
            assert_eq!(pair[0].role, "user");
            if pair.len() == 2 {
                assert_eq!(pair[1].role, "assistant");
            }
        }
    }
}
