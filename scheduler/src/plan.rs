use soapbox_core::PlanEntry;

/// Default spacing between scheduled posts, in seconds.
pub const DEFAULT_BASE_DELAY_SECONDS: u64 = 60;

/// Computes the posting schedule for `links`: entry `i` starts after
/// `i * base_delay_seconds`.
///
/// Linear spacing keeps the cadence uniform and predictable; exponential
/// spacing would cluster early posts into one short window, which trips
/// platform rate limits and reads as spam. This function is the only place
/// spacing policy lives, and it is pure.
pub fn plan(links: &[String], base_delay_seconds: u64) -> Vec<PlanEntry> {
    links
        .iter()
        .enumerate()
        .map(|(i, link)| PlanEntry {
            link: link.clone(),
            after_seconds: i as u64 * base_delay_seconds,
        })
        .collect()
}

/// Collapses a plan into one dispatch carrying every link, delayed by the
/// first computed delay (0 when the plan is empty).
pub fn collapse_single(plan: &[PlanEntry]) -> (Vec<String>, u64) {
    let links = plan.iter().map(|entry| entry.link.clone()).collect();
    let after_seconds = plan.first().map(|entry| entry.after_seconds).unwrap_or(0);
    (links, after_seconds)
}
