pub mod curate;
pub mod dispatch;
pub mod ingest;
pub mod normalize;
pub mod plan;

pub use curate::{CurateOptions, CurateOutcome, CuratePass};
pub use dispatch::{DispatchOutcome, Dispatcher, GENERATE_POST_JOB};
pub use ingest::{record_and_notify, save_ingested, stats};
pub use normalize::{filter_against_snapshots, filter_new_links};
pub use plan::{collapse_single, plan, DEFAULT_BASE_DELAY_SECONDS};
