use crate::config::Settings;
use crate::github::{create_github_client, fetch_repo_context};
use crate::llm::DiffModel;
use crate::prelude::*;
use crate::storage::{forward_record, DiffRecord, RecordStore};
use std::sync::Arc;

/// Name of the variable holding the model credential
pub const MODEL_CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

pub const NO_FILES_MESSAGE: &str = "Repo has no text files we could load (or URL invalid).";

/// Everything a request needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub github: reqwest::Client,
    pub store: Option<RecordStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let github = create_github_client(&settings)?;
        let store = RecordStore::from_settings(&settings);

        if store.is_none() {
            log::info!("Record storage is off, request records will not be stored");
        }

        Ok(Self {
            settings: Arc::new(settings),
            github,
            store,
        })
    }
}

/// Run the generate → reflect workflow for one request.
///
/// Fails fast when no model credential is configured. The final diff is the
/// reviewer's correction when there is one, the generated diff otherwise.
pub async fn generate_diff(state: &AppState, repo_url: &str, prompt: &str) -> AppResult<String> {
    let api_key = state
        .settings
        .model_credential()
        .ok_or_else(|| Error::ConfigurationMissing(MODEL_CREDENTIAL_VAR.to_string()))?;
    let model = DiffModel::new(&state.settings, api_key)?;

    let context = fetch_repo_context(&state.github, &state.settings, repo_url).await?;
    if context.files.is_empty() {
        return Err(Error::InvalidInput(NO_FILES_MESSAGE.to_string()));
    }

    let diff = model.generate_diff(&context, prompt, None).await?;
    log::debug!("Generated diff: {} chars", diff.len());

    let reflection = model.reflect_on_diff(prompt, &diff).await?;
    if reflection.is_correct() {
        log::info!("Reviewer approved the generated diff");
    } else {
        log::info!(
            "Reviewer replaced the generated diff ({} chars)",
            reflection.correction().len()
        );
    }
    let diff = reflection.resolve(diff);

    forward_record(
        state.store.as_ref(),
        DiffRecord {
            repo_url: repo_url.to_string(),
            prompt: prompt.to_string(),
            diff: diff.clone(),
        },
    );

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::tests::{spawn_fake_github, FakeGitHub};
    use crate::llm::tests::{spawn_fake_model, FakeModel, DIFF};

    async fn state_for(github: Arc<FakeGitHub>, model: Arc<FakeModel>) -> AppState {
        AppState::new(Settings {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: Some(spawn_fake_model(model).await),
            github_api_url: spawn_fake_github(github).await,
            ..Settings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_approved_diff_is_returned() {
        let github = Arc::new(FakeGitHub::with_files(&[("README.md", "Hello")]));
        let model = Arc::new(FakeModel::replying(&[
            format!("Sure.\n```diff\n{DIFF}\n```").as_str(),
            "**CORRECT**",
        ]));
        let state = state_for(github, model.clone()).await;

        let diff = generate_diff(&state, "https://github.com/o/r", "Greet the world")
            .await
            .unwrap();

        assert_eq!(diff, DIFF);
        assert_eq!(model.request_count(), 2);
    }

    #[tokio::test]
    async fn test_correction_replaces_generated_diff() {
        let fixed = "diff --git a/README.md b/README.md\n+Hello, everyone";
        let github = Arc::new(FakeGitHub::with_files(&[("README.md", "Hello")]));
        let model = Arc::new(FakeModel::replying(&[DIFF, format!("CORRECTED\n{fixed}").as_str()]));
        let state = state_for(github, model).await;

        let diff = generate_diff(&state, "https://github.com/o/r", "Greet the world")
            .await
            .unwrap();

        assert_eq!(diff, fixed);
    }

    #[tokio::test]
    async fn test_empty_repo_skips_model() {
        let github = Arc::new(FakeGitHub::with_files(&[("assets/logo.png", "png")]));
        let model = Arc::new(FakeModel::replying(&[DIFF, "CORRECT"]));
        let state = state_for(github, model.clone()).await;

        let err = generate_diff(&state, "https://github.com/o/r", "Greet the world")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(ref m) if m == NO_FILES_MESSAGE));
        assert_eq!(model.request_count(), 0);
    }

    #[test]
    fn test_malformed_storage_key_does_not_block_startup() {
        let state = AppState::new(Settings {
            supabase_url: Some("https://example.supabase.co".to_string()),
            supabase_service_key: Some("bad\nkey".to_string()),
            ..Settings::default()
        })
        .unwrap();

        assert!(state.store.is_none());
    }
}
