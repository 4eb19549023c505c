use crate::plan::collapse_single;
use runtime_client::{JobRuntime, RunRequest};
use serde_json::json;
use soapbox_core::{CoreError, DispatchMode, PlanEntry, RunConfigurable, ThreadRunId};
use tracing::{info, warn};

/// Job started on the runtime for each planned batch of links.
pub const GENERATE_POST_JOB: &str = "generate_post";

/// Result of dispatching one plan. Partial failure is not an error: compare
/// `handles.len()` against `planned` to observe it.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Dispatches the plan called for.
    pub planned: usize,
    /// Handles for the runs the runtime accepted, in dispatch order.
    pub handles: Vec<ThreadRunId>,
    /// Links covered by accepted runs, for callers that persist used links.
    pub accepted_links: Vec<String>,
    /// Creations that failed and were skipped.
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Submits planned batches to the job runtime.
///
/// Fire-and-forget: a handle means the runtime accepted the run, nothing
/// more. One failed creation never aborts the remaining entries.
pub struct Dispatcher<'a> {
    runtime: &'a dyn JobRuntime,
    job_name: String,
}

impl<'a> Dispatcher<'a> {
    pub fn new(runtime: &'a dyn JobRuntime) -> Self {
        Self {
            runtime,
            job_name: GENERATE_POST_JOB.to_string(),
        }
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = job_name.into();
        self
    }

    pub async fn dispatch(
        &self,
        plan: &[PlanEntry],
        mode: DispatchMode,
        configurable: &RunConfigurable,
    ) -> DispatchOutcome {
        if plan.is_empty() {
            return DispatchOutcome::default();
        }

        let mut outcome = DispatchOutcome::default();

        match mode {
            DispatchMode::Single => {
                // One post for all links, using the first computed delay.
                outcome.planned = 1;
                let (links, after_seconds) = collapse_single(plan);
                match self
                    .dispatch_one(links.clone(), after_seconds, configurable)
                    .await
                {
                    Ok(handle) => {
                        outcome.handles.push(handle);
                        outcome.accepted_links.extend(links);
                    }
                    Err(e) => {
                        warn!("Failed to create collapsed run: {}", e);
                        outcome.failed += 1;
                    }
                }
            }
            DispatchMode::Multiple => {
                // One post per link, each with its own delay.
                outcome.planned = plan.len();
                for entry in plan {
                    let links = vec![entry.link.clone()];
                    match self
                        .dispatch_one(links, entry.after_seconds, configurable)
                        .await
                    {
                        Ok(handle) => {
                            outcome.handles.push(handle);
                            outcome.accepted_links.push(entry.link.clone());
                        }
                        Err(e) => {
                            warn!(link = %entry.link, "Failed to create run: {}", e);
                            outcome.failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            planned = outcome.planned,
            accepted = outcome.handles.len(),
            failed = outcome.failed,
            "Dispatch finished"
        );
        outcome
    }

    async fn dispatch_one(
        &self,
        links: Vec<String>,
        after_seconds: u64,
        configurable: &RunConfigurable,
    ) -> Result<ThreadRunId, CoreError> {
        let thread_id = self.runtime.create_thread().await?;
        let request = RunRequest::new(json!({ "links": links }))
            .with_configurable(configurable.clone())
            .with_after_seconds(after_seconds);
        let run_id = self
            .runtime
            .create_run(&thread_id, &self.job_name, request)
            .await?;
        Ok(ThreadRunId { thread_id, run_id })
    }
}
