//! OpenAI-compatible chat completion client
//!
//! Talks to any `/chat/completions` endpoint (GitHub Models by default).
//! Tools are exposed as function schemas with a single `input` string.

use std::time::Duration;

use async_trait::async_trait;
use lab_application::{ChatCompletion, ChatModel, GatewayError};
use lab_domain::{ChatMessage, ToolCall, ToolDefinition};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// Connection settings for [`OpenAiChatModel`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Bearer token; `None` is allowed until a request is made
    pub token: Option<String>,
    /// Where the token was expected, for error messages
    pub token_env: String,
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into(),
            temperature: 0.0,
            token: None,
            token_env: "GITHUB_TOKEN".to_string(),
            timeout: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_token(mut self, token: Option<String>, token_env: impl Into<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self.token_env = token_env.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAiChatModel {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiChatModel {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Request body for a conversation plus tool schemas
    pub fn build_request(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(WireMessage::from_message).collect(),
            temperature: self.config.temperature,
            tools: tools.iter().map(WireTool::from_definition).collect(),
            max_tokens: None,
        }
    }

    /// POST a request and hand back the raw response, whatever its status.
    ///
    /// Only transport failures are errors here.
    pub async fn post(&self, request: &ChatRequest) -> Result<Response, GatewayError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or_else(|| GatewayError::MissingToken(self.config.token_env.clone()))?;

        self.client
            .post(self.completions_url())
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Connection(e.to_string())
                }
            })
    }
}

/// Turn a non-success response into [`GatewayError::Http`]
pub async fn error_for_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        body,
    })
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatCompletion, GatewayError> {
        let request = self.build_request(messages, tools);
        debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion"
        );

        let response = error_for_status(self.post(&request).await?).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parsed.into_completion()
    }
}

// ==================== Wire types ====================

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    fn from_message(message: &ChatMessage) -> Self {
        let tool_calls = message.has_tool_calls().then(|| {
            message
                .tool_calls
                .iter()
                .map(WireToolCall::from_call)
                .collect()
        });
        Self {
            role: message.role.as_str().to_string(),
            content: Some(message.content.clone()),
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }

    fn into_message(self) -> Result<ChatMessage, GatewayError> {
        let content = self.content.unwrap_or_default();
        match self.role.as_str() {
            "assistant" => {
                let calls: Vec<ToolCall> = self
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(WireToolCall::into_call)
                    .collect();
                Ok(ChatMessage::assistant_with_calls(content, calls))
            }
            "user" => Ok(ChatMessage::user(content)),
            "system" => Ok(ChatMessage::system(content)),
            "tool" => Ok(ChatMessage::tool_result(
                self.tool_call_id.unwrap_or_default(),
                content,
            )),
            other => Err(GatewayError::InvalidResponse(format!(
                "unexpected message role '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

impl WireToolCall {
    fn from_call(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: json!({ "input": call.input }).to_string(),
            },
        }
    }

    fn into_call(self) -> ToolCall {
        let input = tool_input(&self.function.arguments);
        ToolCall::new(self.id, self.function.name, input)
    }
}

/// The single string argument out of a function-call argument blob.
///
/// Prefers `input`, then the first string value; anything else is passed
/// through raw so the tool can report it.
pub fn tool_input(arguments: &str) -> String {
    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) => match map.get("input") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => map
                .values()
                .find_map(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        },
        Ok(Value::String(s)) => s,
        _ => arguments.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl WireTool {
    fn from_definition(definition: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: definition.name.clone(),
                description: definition.description.clone(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "input": { "type": "string", "description": "Tool input" }
                    },
                    "required": ["input"]
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChoice {
    pub message: WireMessage,
}

impl ChatResponse {
    fn into_completion(self) -> Result<ChatCompletion, GatewayError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".into()))?;
        Ok(ChatCompletion::new(choice.message.into_message()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenAiChatModel {
        OpenAiChatModel::new(
            OpenAiConfig::new("openai/gpt-4o", "https://models.github.ai/inference/")
                .with_token(Some("t".into()), "GITHUB_TOKEN"),
        )
        .unwrap()
    }

    #[test]
    fn test_completions_url_trims_slash() {
        assert_eq!(
            model().completions_url(),
            "https://models.github.ai/inference/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("What is 25 * 4 + 10?"),
            ChatMessage::assistant_with_calls(
                "",
                vec![ToolCall::new("call_1", "Calculator", "25 * 4 + 10")],
            ),
            ChatMessage::tool_result("call_1", "110"),
        ];
        let tools = vec![ToolDefinition {
            name: "Calculator".into(),
            description: "Evaluates a math expression string (e.g., '25 * 4 + 10').".into(),
        }];

        let body = serde_json::to_value(model().build_request(&messages, &tools)).unwrap();

        assert_eq!(body["model"], "openai/gpt-4o");
        assert_eq!(body["temperature"], 0.0);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0].get("tool_calls").is_none());
        let call = &body["messages"][2]["tool_calls"][0];
        assert_eq!(call["type"], "function");
        assert_eq!(call["function"]["name"], "Calculator");
        let args: Value = serde_json::from_str(call["function"]["arguments"].as_str().unwrap())
            .unwrap();
        assert_eq!(args["input"], "25 * 4 + 10");
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"][0], "input");
    }

    #[test]
    fn test_no_tools_omits_field() {
        let body =
            serde_json::to_value(model().build_request(&[ChatMessage::user("ping")], &[]))
                .unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_response_with_tool_calls() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_weather", "arguments": "{\"input\":\"2023-04-05\"}"}
                    }]
                }
            }]
        }"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion().unwrap();

        assert!(completion.wants_tools());
        assert_eq!(
            completion.message.tool_calls,
            vec![ToolCall::new("call_9", "get_weather", "2023-04-05")]
        );
        assert_eq!(completion.message.content, "");
    }

    #[test]
    fn test_response_final_answer() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"110"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion().unwrap();
        assert!(!completion.wants_tools());
        assert_eq!(completion.message.content, "110");
    }

    #[test]
    fn test_empty_choices_is_invalid() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_completion(),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_tool_input_extraction() {
        assert_eq!(tool_input(r#"{"input":"abc"}"#), "abc");
        assert_eq!(tool_input(r#"{"expression":"1+1"}"#), "1+1");
        assert_eq!(tool_input(r#"{"input":42}"#), "42");
        assert_eq!(tool_input(r#""quoted""#), "quoted");
        assert_eq!(tool_input("not json"), "not json");
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let model = OpenAiChatModel::new(
            OpenAiConfig::new("openai/gpt-4o", "http://127.0.0.1:9")
                .with_token(None, "MY_TOKEN"),
        )
        .unwrap();

        let err = model
            .complete(&[ChatMessage::user("ping")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::MissingToken(ref env) if env == "MY_TOKEN"));
    }
}
