use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::ingest::record_and_notify;
use crate::normalize::filter_new_links;
use crate::plan::{plan, DEFAULT_BASE_DELAY_SECONDS};
use dedup_store::KeySetStore;
use notifier::NotifySink;
use runtime_client::JobRuntime;
use soapbox_core::{CoreError, DispatchMode, IngestStats, RawItem, RunConfigurable, ThreadRunId};
use tracing::info;

/// Options for one curation pass.
#[derive(Debug, Clone)]
pub struct CurateOptions {
    pub mode: DispatchMode,
    pub base_delay_seconds: u64,
    /// Forwarded verbatim into every dispatched run.
    pub configurable: RunConfigurable,
    /// Identity of the pass itself, included in notifications when known.
    pub context: Option<ThreadRunId>,
}

impl Default for CurateOptions {
    fn default() -> Self {
        Self {
            mode: DispatchMode::default(),
            base_delay_seconds: DEFAULT_BASE_DELAY_SECONDS,
            configurable: RunConfigurable::default().with_origin("curate-data"),
            context: None,
        }
    }
}

/// What one curation pass did, for callers that report results.
#[derive(Debug, Clone)]
pub struct CurateOutcome {
    /// Links that survived dedup filtering, in scheduling order.
    pub new_links: Vec<String>,
    pub dispatch: DispatchOutcome,
    pub stats: IngestStats,
}

/// One end-to-end scheduling pass: normalize and dedup-filter the raw
/// items, plan the posting cadence, dispatch one run per batch, then record
/// the seen ids and send the completion notification.
pub struct CuratePass<'a> {
    store: &'a dyn KeySetStore,
    runtime: &'a dyn JobRuntime,
    sink: &'a dyn NotifySink,
}

impl<'a> CuratePass<'a> {
    pub fn new(
        store: &'a dyn KeySetStore,
        runtime: &'a dyn JobRuntime,
        sink: &'a dyn NotifySink,
    ) -> Self {
        Self {
            store,
            runtime,
            sink,
        }
    }

    pub async fn run(
        &self,
        items: &[RawItem],
        options: &CurateOptions,
    ) -> Result<CurateOutcome, CoreError> {
        // Primary path: a store failure here aborts the pass rather than
        // over-posting everything as "never seen".
        let new_links = filter_new_links(self.store, items).await?;
        info!(
            incoming = items.len(),
            new = new_links.len(),
            mode = ?options.mode,
            "Curation pass planned"
        );

        let schedule = plan(&new_links, options.base_delay_seconds);
        let dispatch = Dispatcher::new(self.runtime)
            .dispatch(&schedule, options.mode, &options.configurable)
            .await;

        // Every raw id gets recorded, dispatched or not, so the next pass
        // skips the whole batch.
        let stats =
            record_and_notify(self.store, self.sink, items, options.context.as_ref()).await;

        Ok(CurateOutcome {
            new_links,
            dispatch,
            stats,
        })
    }
}
