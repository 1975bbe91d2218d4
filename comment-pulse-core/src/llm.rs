use {
    std::time::Duration,
    serde::{Serialize, Deserialize},
    reqwest::StatusCode,
    anyhow::{anyhow, Result},
};

const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat-completion provider used for summaries and reply suggestions. Any
/// failure here is absorbed by the calling stage, which falls back to its
/// local path.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
        }
    }

    /// Run one user-prompt completion and return the trimmed response text.
    /// An empty completion is an error so that callers take their fallback.
    pub async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens,
            temperature,
        };

        let res = self.client.post(CHAT_COMPLETIONS_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Err(anyhow!("llm provider returned status: {}", res.status().as_u16()));
        }

        let response: ChatResponse = res.json().await?;
        let content = response.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_owned())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(anyhow!("llm provider returned an empty completion"));
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_chat_request() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage { role: "user", content: "Summarize this" }],
            max_tokens: 300,
            temperature: 0.3,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn deserializes_chat_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  A short summary.  "}}]
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content.trim(), "A short summary.");
    }

    #[test]
    fn empty_choices_deserialize() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.choices.is_empty());
    }
}
