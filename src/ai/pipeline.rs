//! Multi-stage message builders.
//!
//! A commit build runs three chat completions in sequence (summarize,
//! build, format); a release build runs one. Each stage consumes the
//! previous stage's output, so a failure anywhere aborts the whole run and
//! nothing partial is returned.

use std::fmt;
use std::sync::Arc;

use super::{AiError, ChatMessage, ChatTransport, DEFAULT_MODEL};
use crate::core::PromptConfig;
use crate::git::WorkspaceCommit;

/// Delimiter placed between commits in the release input document.
pub const COMMIT_SEPARATOR: &str = "--- COMMIT SEPARATOR ---";

/// Which step of a build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Summarize,
    Build,
    Format,
    Release,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summarize => "summary",
            Self::Build => "commit builder",
            Self::Format => "output format",
            Self::Release => "release",
        };
        f.write_str(name)
    }
}

/// A failed stage, carrying the prompt that was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the {stage} stage failed: {source}")]
pub struct AiStageError {
    pub stage: PipelineStage,
    pub prompt: String,
    #[source]
    pub source: AiError,
}

/// Anything that can abort a background build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("could not collect the staged diff: {0}")]
    Diff(String),

    #[error(transparent)]
    Stage(#[from] AiStageError),
}

/// Inputs of a commit build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBuildInput {
    /// Short description written by the user
    pub title: String,
    pub commit_type: String,
    pub scope: String,
    /// Diff context for the summary stage
    pub diff: String,
}

/// Release title and body split from the model's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseText {
    pub title: String,
    pub body: String,
}

impl ReleaseText {
    /// Split on the first newline. Text without a newline is all title.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once('\n') {
            Some((title, body)) => {
                Self { title: title.trim().to_string(), body: body.trim().to_string() }
            }
            None => Self { title: text.to_string(), body: String::new() },
        }
    }
}

/// Joins commits into the release input document.
pub fn release_document(commits: &[WorkspaceCommit]) -> String {
    commits
        .iter()
        .map(|commit| {
            let mut block = format!("COMMIT: {}\nDATE: {}\nSUBJECT: {}\n", commit.hash, commit.date, commit.subject);
            if !commit.body.is_empty() {
                block.push_str(&format!("BODY:\n{}\n", commit.body));
            }
            block
        })
        .collect::<Vec<_>>()
        .join(&format!("\n{COMMIT_SEPARATOR}\n"))
}

fn model_or_default(model: &str) -> &str {
    if model.trim().is_empty() {
        DEFAULT_MODEL
    } else {
        model
    }
}

/// Chains chat completions into commit and release builds.
pub struct AiPipeline {
    transport: Arc<dyn ChatTransport>,
    prompts: PromptConfig,
}

impl AiPipeline {
    pub fn new(transport: Arc<dyn ChatTransport>, prompts: PromptConfig) -> Self {
        Self { transport, prompts }
    }

    async fn run_stage(
        &self,
        stage: PipelineStage,
        api_key: &str,
        system: &str,
        model: &str,
        input: String,
    ) -> Result<String, AiStageError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(input)];
        let model = model_or_default(model);
        tracing::debug!(%stage, model, transport = self.transport.name(), "running pipeline stage");

        self.transport.complete(api_key, model, &messages).await.map_err(|source| {
            tracing::warn!(%stage, error = %source, "pipeline stage failed");
            AiStageError { stage, prompt: system.to_string(), source }
        })
    }

    /// Summarize, build and format a commit message.
    ///
    /// Returns the translated message only when all three stages succeed.
    pub async fn build_commit(
        &self,
        api_key: &str,
        input: &CommitBuildInput,
    ) -> Result<String, AiStageError> {
        let p = &self.prompts;

        let summary = self
            .run_stage(
                PipelineStage::Summarize,
                api_key,
                &p.summary_prompt,
                &p.summary_prompt_model,
                format!("TITLE:\n{}\nCONTEXT:\n{}", input.title, input.diff),
            )
            .await?;

        let draft = self
            .run_stage(
                PipelineStage::Build,
                api_key,
                &p.commit_builder_prompt,
                &p.commit_builder_prompt_model,
                format!("COMMIT TYPE: {}\nSUMMARY:\n{}", input.commit_type, summary),
            )
            .await?;

        let preamble = format!("{} {}: ", input.commit_type, input.scope);
        let formatted = self
            .run_stage(
                PipelineStage::Format,
                api_key,
                &p.output_format_prompt,
                &p.output_format_prompt_model,
                format!("[PREAMBLE]: {preamble}\n{draft}"),
            )
            .await?;

        Ok(formatted.trim().to_string())
    }

    /// Build release notes for `commits`, in the given order.
    pub async fn build_release(
        &self,
        api_key: &str,
        commits: &[WorkspaceCommit],
    ) -> Result<ReleaseText, AiStageError> {
        let text = self
            .run_stage(
                PipelineStage::Release,
                api_key,
                &self.prompts.release_prompt,
                &self.prompts.release_prompt_model,
                release_document(commits),
            )
            .await?;

        Ok(ReleaseText::parse(&text))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::ai::{AiError, ChatMessage, ChatTransport};

    /// Transport answering from a queue and recording every request.
    #[derive(Default)]
    pub struct FakeTransport {
        replies: Mutex<VecDeque<Result<String, AiError>>>,
        pub requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl FakeTransport {
        pub fn with_replies(replies: Vec<Result<String, AiError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), requests: Mutex::default() }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn complete(
            &self,
            _api_key: &str,
            model: &str,
            messages: &[ChatMessage],
        ) -> Result<String, AiError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push((model.to_string(), messages.to_vec()));
            }
            self.replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front())
                .unwrap_or(Err(AiError::NoChoices))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;

    fn input() -> CommitBuildInput {
        CommitBuildInput {
            title: "handle nil user".to_string(),
            commit_type: "FIX".to_string(),
            scope: "auth".to_string(),
            diff: "=== auth.go ===\n+if u == nil {}\n".to_string(),
        }
    }

    fn commit(hash: &str, subject: &str) -> WorkspaceCommit {
        WorkspaceCommit {
            hash: hash.to_string(),
            subject: subject.to_string(),
            body: String::new(),
            date: "24-05-01 10:00".to_string(),
            diff: String::new(),
        }
    }

    #[tokio::test]
    async fn test_commit_build_chains_three_stages() {
        let transport = Arc::new(FakeTransport::with_replies(vec![
            Ok("summary".to_string()),
            Ok("draft".to_string()),
            Ok("  Handle nil user in login  \n".to_string()),
        ]));
        let pipeline = AiPipeline::new(transport.clone(), PromptConfig::default());

        let result = pipeline.build_commit("key", &input()).await.unwrap();
        assert_eq!(result, "Handle nil user in login");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].0, DEFAULT_MODEL);
        assert_eq!(requests[0].1[1].content, "TITLE:\nhandle nil user\nCONTEXT:\n=== auth.go ===\n+if u == nil {}\n");
        assert!(requests[1].1[1].content.contains("summary"));
        assert_eq!(requests[2].1[1].content, "[PREAMBLE]: FIX auth: \ndraft");
    }

    #[tokio::test]
    async fn test_commit_build_stops_at_failed_stage() {
        let transport = Arc::new(FakeTransport::with_replies(vec![
            Ok("summary".to_string()),
            Err(AiError::Status { status: 500, body: "boom".to_string() }),
            Ok("never used".to_string()),
        ]));
        let pipeline = AiPipeline::new(transport.clone(), PromptConfig::default());

        let err = pipeline.build_commit("key", &input()).await.unwrap_err();
        assert_eq!(err.stage, PipelineStage::Build);
        assert_eq!(err.prompt, PromptConfig::default().commit_builder_prompt);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_release_build_splits_title_and_body() {
        let transport = Arc::new(FakeTransport::with_replies(vec![Ok(
            "v2 highlights\n\n- faster login\n- fewer crashes".to_string(),
        )]));
        let pipeline = AiPipeline::new(transport.clone(), PromptConfig::default());

        let commits = vec![commit("aaa", "Add login"), commit("bbb", "Fix crash")];
        let release = pipeline.build_release("key", &commits).await.unwrap();

        assert_eq!(release.title, "v2 highlights");
        assert_eq!(release.body, "- faster login\n- fewer crashes");

        let requests = transport.requests.lock().unwrap();
        let document = &requests[0].1[1].content;
        assert!(document.find("aaa").unwrap() < document.find("bbb").unwrap());
        assert_eq!(document.matches(COMMIT_SEPARATOR).count(), 1);
    }

    #[test]
    fn test_release_text_without_newline_is_title_only() {
        let text = ReleaseText::parse("Just a title");
        assert_eq!(text.title, "Just a title");
        assert!(text.body.is_empty());
    }
}
