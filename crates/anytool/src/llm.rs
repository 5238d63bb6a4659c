use crate::config::Settings;
use crate::prelude::*;
use anytool_core::diff::{
    build_generate_prompt, build_reflect_prompt, extract_diff, format_repo_context,
    parse_reflection, Reflection, GENERATE_PREAMBLE, REFLECT_PREAMBLE,
};
use anytool_core::github::RepoContext;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use std::time::Duration;

const GENERATE_TEMPERATURE: f64 = 0.2;
const REFLECT_TEMPERATURE: f64 = 0.1;

/// Language model used for both passes of the workflow.
pub struct DiffModel {
    client: openai::CompletionsClient,
    model: String,
    timeout: Duration,
}

impl DiffModel {
    pub fn new(settings: &Settings, api_key: &str) -> AppResult<Self> {
        let builder = openai::Client::builder().api_key(api_key);
        let builder = match settings.openai_base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => builder.base_url(url),
            _ => builder,
        };
        // Chat Completions, which every OpenAI-compatible endpoint serves.
        let client = builder
            .build()
            .map_err(|e| Error::Model(f!("Failed to create OpenAI client: {e}")))?
            .completions_api();

        Ok(Self {
            client,
            model: settings.model.clone(),
            timeout: settings.model_timeout(),
        })
    }

    /// Single-turn completion with a fixed system instruction.
    async fn complete(&self, preamble: &str, temperature: f64, prompt: &str) -> AppResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(temperature)
            .build();

        match tokio::time::timeout(self.timeout, agent.prompt(prompt)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(Error::Model(e.to_string())),
            Err(_) => Err(Error::Model(f!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    /// First pass: produce a unified diff for `prompt`.
    ///
    /// `feedback` carries an earlier reviewer remark into the request.
    pub async fn generate_diff(
        &self,
        context: &RepoContext,
        prompt: &str,
        feedback: Option<&str>,
    ) -> AppResult<String> {
        let repo_text = format_repo_context(context);
        let message = build_generate_prompt(&repo_text, prompt, feedback);
        log::debug!("Generation prompt length: {} chars", message.len());

        let response = self
            .complete(GENERATE_PREAMBLE, GENERATE_TEMPERATURE, &message)
            .await?;

        let extraction = extract_diff(&response);
        if !extraction.is_diff() {
            log::warn!("Generation response contained no diff marker, returning it verbatim");
        }
        Ok(extraction.into_text())
    }

    /// Second pass: review `diff` against `prompt`.
    pub async fn reflect_on_diff(&self, prompt: &str, diff: &str) -> AppResult<Reflection> {
        let message = build_reflect_prompt(prompt, diff);
        let response = self
            .complete(REFLECT_PREAMBLE, REFLECT_TEMPERATURE, &message)
            .await?;

        Ok(parse_reflection(&response))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anytool_core::github::FileContent;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    pub(crate) const DIFF: &str =
        "diff --git a/README.md b/README.md\n--- a/README.md\n+++ b/README.md\n@@ -1 +1 @@\n-Hello\n+Hello, world";

    /// Scripted stand-in for an OpenAI-compatible chat completions endpoint.
    #[derive(Default)]
    pub(crate) struct FakeModel {
        replies: Mutex<VecDeque<(StatusCode, String)>>,
        delay: Option<Duration>,
        pub requests: Mutex<Vec<Value>>,
    }

    impl FakeModel {
        pub(crate) fn replying(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .iter()
                        .map(|reply| (StatusCode::OK, reply.to_string()))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        pub(crate) fn failing(status: StatusCode) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([(status, "upstream exploded".to_string())])),
                ..Self::default()
            }
        }

        pub(crate) fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::replying(&["CORRECT"])
            }
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    async fn completions_handler(
        State(fake): State<Arc<FakeModel>>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        fake.requests.lock().unwrap().push(body);
        if let Some(delay) = fake.delay {
            tokio::time::sleep(delay).await;
        }

        let (status, content) = fake
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "no reply scripted".to_string()));

        if !status.is_success() {
            return (
                status,
                Json(json!({"error": {"message": content, "type": "server_error"}})),
            );
        }

        (
            status,
            Json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 0,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
            })),
        )
    }

    /// Serve `fake` on an ephemeral port and return the API base URL.
    pub(crate) async fn spawn_fake_model(fake: Arc<FakeModel>) -> String {
        let router = Router::new()
            .route("/v1/chat/completions", post(completions_handler))
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}/v1")
    }

    fn context() -> RepoContext {
        RepoContext {
            owner: "o".to_string(),
            repo: "r".to_string(),
            default_branch: "main".to_string(),
            files: vec![FileContent {
                path: "README.md".to_string(),
                content: "Hello".to_string(),
            }],
        }
    }

    async fn model_for(fake: Arc<FakeModel>, model_timeout: u64) -> DiffModel {
        let settings = Settings {
            openai_base_url: Some(spawn_fake_model(fake).await),
            model_timeout,
            ..Settings::default()
        };
        DiffModel::new(&settings, "sk-test").unwrap()
    }

    #[tokio::test]
    async fn test_fenced_diff_then_approval_keeps_original() {
        let fake = Arc::new(FakeModel::replying(&[
            format!("Here you go:\n```diff\n{DIFF}\n```\nEnjoy.").as_str(),
            "CORRECT",
        ]));
        let model = model_for(fake.clone(), 30).await;

        let diff = model
            .generate_diff(&context(), "Greet the world", None)
            .await
            .unwrap();
        assert_eq!(diff, DIFF);

        let reflection = model.reflect_on_diff("Greet the world", &diff).await.unwrap();
        assert_eq!(reflection, Reflection::Approved);
        assert_eq!(reflection.resolve(diff), DIFF);

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["model"], "gpt-4o-mini");
        assert!(requests[0].to_string().contains("Greet the world"));
        assert!(requests[0].to_string().contains("README.md"));
        assert!(requests[1].to_string().contains("+Hello, world"));
    }

    #[tokio::test]
    async fn test_corrected_reply_replaces_diff() {
        let fixed = "diff --git a/README.md b/README.md\n+Hello, everyone";
        let fake = Arc::new(FakeModel::replying(&[DIFF, format!("CORRECTED\n{fixed}").as_str()]));
        let model = model_for(fake, 30).await;

        let diff = model
            .generate_diff(&context(), "Greet the world", None)
            .await
            .unwrap();
        let reflection = model.reflect_on_diff("Greet the world", &diff).await.unwrap();

        assert_eq!(reflection, Reflection::Corrected(fixed.to_string()));
        assert_eq!(reflection.resolve(diff), fixed);
    }

    #[tokio::test]
    async fn test_provider_error_is_model_error() {
        let fake = Arc::new(FakeModel::failing(StatusCode::INTERNAL_SERVER_ERROR));
        let model = model_for(fake.clone(), 30).await;

        let err = model
            .generate_diff(&context(), "Greet the world", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Model(_)), "{err:?}");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(fake.request_count() >= 1);
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let fake = Arc::new(FakeModel::slow(Duration::from_secs(5)));
        let model = model_for(fake, 1).await;

        let err = model.reflect_on_diff("Greet the world", DIFF).await.unwrap_err();
        match err {
            Error::Model(message) => assert!(message.contains("1s"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
