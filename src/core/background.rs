//! Background execution of pipeline runs and history loads.
//!
//! The engine returns [`Task`]s; the runner spawns each one on the tokio
//! runtime and sends the outcome back as an [`Event::AsyncResult`] tagged
//! with the task's generation. The UI thread never blocks on the network
//! or on `git log`.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use super::event::{
    AsyncResult, CommitBuildOutput, CommitBuildRequest, DiffSource, Event, HistoryRequest,
    ReleaseBuildRequest, Task,
};
use crate::ai::{AiPipeline, BuildError, CommitBuildInput};
use crate::git::GitResolver;

/// Spawns engine tasks and reports their results over a channel.
pub struct TaskRunner {
    handle: Handle,
    pipeline: Arc<AiPipeline>,
    resolver: Arc<GitResolver>,
    events: UnboundedSender<Event>,
}

impl TaskRunner {
    pub fn new(
        handle: Handle,
        pipeline: Arc<AiPipeline>,
        resolver: Arc<GitResolver>,
        events: UnboundedSender<Event>,
    ) -> Self {
        Self { handle, pipeline, resolver, events }
    }

    /// Start every task without waiting for any of them.
    pub fn spawn_all(&self, tasks: Vec<Task>) {
        for task in tasks {
            self.spawn(task);
        }
    }

    pub fn spawn(&self, task: Task) {
        let pipeline = Arc::clone(&self.pipeline);
        let resolver = Arc::clone(&self.resolver);
        let events = self.events.clone();
        tracing::debug!(generation = task.generation(), "spawning background task");

        match task {
            Task::BuildCommit(request) => {
                self.handle.spawn(async move {
                    let generation = request.generation;
                    let result = run_commit_build(&pipeline, resolver, request).await;
                    send(&events, AsyncResult::CommitBuilt { generation, result });
                });
            }
            Task::BuildRelease(request) => {
                self.handle.spawn(async move {
                    let ReleaseBuildRequest { generation, api_key, commits } = request;
                    let result = pipeline.build_release(&api_key, &commits).await;
                    send(&events, AsyncResult::ReleaseBuilt { generation, result });
                });
            }
            Task::LoadHistory(HistoryRequest { generation, max_commits }) => {
                self.handle.spawn_blocking(move || {
                    let result =
                        resolver.workspace_history(max_commits).map_err(|err| err.to_string());
                    send(&events, AsyncResult::HistoryLoaded { generation, result });
                });
            }
        }
    }
}

fn send(events: &UnboundedSender<Event>, result: AsyncResult) {
    let generation = result.generation();
    if events.send(Event::AsyncResult(result)).is_err() {
        tracing::debug!(generation, "event loop gone, dropping result");
    }
}

/// Collect the diff (off the async threads) and run the three stages.
pub async fn run_commit_build(
    pipeline: &AiPipeline,
    resolver: Arc<GitResolver>,
    request: CommitBuildRequest,
) -> Result<CommitBuildOutput, BuildError> {
    let CommitBuildRequest { api_key, title, commit_type, scope, diff, .. } = request;

    let (diff, fresh) = match diff {
        DiffSource::Stored(diff) => (diff, false),
        DiffSource::Staged { max_chars } => {
            let collected =
                tokio::task::spawn_blocking(move || resolver.staged_diff_summary(max_chars))
                    .await
                    .map_err(|err| BuildError::Diff(err.to_string()))?
                    .map_err(|err| BuildError::Diff(err.to_string()))?;
            (collected, true)
        }
    };

    let input = CommitBuildInput { title, commit_type, scope, diff };
    let translated = pipeline.build_commit(&api_key, &input).await?;

    Ok(CommitBuildOutput {
        original: input.title,
        translated,
        diff_snapshot: fresh.then_some(input.diff),
    })
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::ai::pipeline::testing::FakeTransport;
    use crate::core::PromptConfig;
    use crate::git::testing::ScriptedGit;
    use crate::git::GitOutput;

    fn resolver() -> Arc<GitResolver> {
        Arc::new(GitResolver::new(Box::new(
            ScriptedGit::default()
                .with("diff --cached --name-only -z", GitOutput::ok("a.rs\0"))
                .with("diff --cached -- a.rs", GitOutput::ok("+fn a() {}\n")),
        )))
    }

    fn request(diff: DiffSource) -> CommitBuildRequest {
        CommitBuildRequest {
            generation: 4,
            api_key: "key".to_string(),
            title: "add a".to_string(),
            commit_type: "ADD".to_string(),
            scope: "a.rs".to_string(),
            diff,
        }
    }

    #[tokio::test]
    async fn test_staged_diff_is_collected_and_returned() {
        let transport = Arc::new(FakeTransport::with_replies(vec![
            Ok("s".to_string()),
            Ok("d".to_string()),
            Ok("Add a".to_string()),
        ]));
        let pipeline = AiPipeline::new(transport.clone(), PromptConfig::default());

        let output = run_commit_build(&pipeline, resolver(), request(DiffSource::Staged { max_chars: 1000 }))
            .await
            .unwrap();

        assert_eq!(output.original, "add a");
        assert_eq!(output.translated, "Add a");
        assert_eq!(output.diff_snapshot.as_deref(), Some("=== a.rs ===\n+fn a() {}\n"));
    }

    #[tokio::test]
    async fn test_stored_diff_skips_git() {
        let transport = Arc::new(FakeTransport::with_replies(vec![
            Ok("s".to_string()),
            Ok("d".to_string()),
            Ok("Add a".to_string()),
        ]));
        let pipeline = AiPipeline::new(transport.clone(), PromptConfig::default());

        let output =
            run_commit_build(&pipeline, resolver(), request(DiffSource::Stored("old diff".to_string())))
                .await
                .unwrap();

        assert!(output.diff_snapshot.is_none());
        let requests = transport.requests.lock().unwrap();
        assert!(requests[0].1[1].content.ends_with("CONTEXT:\nold diff"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_runner_reports_generation() {
        let transport = Arc::new(FakeTransport::with_replies(vec![Err(crate::ai::AiError::NoChoices)]));
        let pipeline = Arc::new(AiPipeline::new(transport, PromptConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = TaskRunner::new(Handle::current(), pipeline, resolver(), tx);

        runner.spawn(Task::BuildCommit(request(DiffSource::Stored(String::new()))));

        match rx.recv().await {
            Some(Event::AsyncResult(AsyncResult::CommitBuilt { generation, result })) => {
                assert_eq!(generation, 4);
                assert!(matches!(result, Err(BuildError::Stage(_))));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_history_load_runs_off_the_caller() {
        let pipeline = Arc::new(AiPipeline::new(
            Arc::new(FakeTransport::with_replies(Vec::new())),
            PromptConfig::default(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = TaskRunner::new(Handle::current(), pipeline, resolver(), tx);

        runner.spawn(Task::LoadHistory(HistoryRequest { generation: 9, max_commits: 10 }));

        match rx.recv().await {
            Some(Event::AsyncResult(AsyncResult::HistoryLoaded { generation, result })) => {
                assert_eq!(generation, 9);
                // The scripted shell knows no `git log`.
                assert!(result.unwrap_err().contains("log -p --max-count=10"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
