use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{debug, warn};

use codeloom_common::types::{ComponentEvidence, MappingSchema};

use crate::prompt;
use crate::traits::{AttemptFeedback, ProposalContext, ProposalResponse, ProposalSource};
use crate::wire::{ChatRequest, ChatResponse, ToolDefinitionWire, WireMessage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROPOSAL_TOOL: &str = "propose_mapping";

/// Claude-backed proposal source. Each call is a single tool-forced
/// request carrying the full context — no conversation state survives
/// between attempts.
#[derive(Clone)]
pub struct ClaudeProposer {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl ClaudeProposer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/messages", self.base_url);
        debug!(model = request.model.as_str(), "proposal request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Claude API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProposalSource for ClaudeProposer {
    async fn propose(
        &self,
        context: &ProposalContext,
        evidence: &ComponentEvidence,
        prior: Option<&AttemptFeedback>,
    ) -> Result<ProposalResponse> {
        let schema = serde_json::to_value(schemars::schema_for!(MappingSchema))?;
        let request = ChatRequest::new(&self.model)
            .system(prompt::PROPOSAL_SYSTEM_PROMPT)
            .message(WireMessage::user(prompt::user_prompt(
                context, evidence, prior,
            )))
            .temperature(0.0)
            .forced_tool(ToolDefinitionWire {
                name: PROPOSAL_TOOL.to_string(),
                description: "Propose a mapping schema for the component.".to_string(),
                input_schema: schema,
            });

        let response = self.chat(&request).await?;

        if let Some(input) = response.tool_input() {
            return match serde_json::from_value::<MappingSchema>(input.clone()) {
                Ok(schema) => Ok(ProposalResponse::Schema(schema)),
                Err(e) => {
                    warn!(
                        component = context.component_name.as_str(),
                        error = %e,
                        "tool response did not deserialize as a mapping schema"
                    );
                    Ok(ProposalResponse::Unparsable(input.to_string()))
                }
            };
        }

        // No tool call at all — hand back whatever text came out.
        Ok(ProposalResponse::Unparsable(
            response.text().unwrap_or_default(),
        ))
    }
}
