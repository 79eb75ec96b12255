use std::cmp::Ordering;
use crate::core::ImageJob;
use crate::registry::JobRegistry;
use crate::utils::size::reduction_ratio;
use super::{SortKey, SortOrder, ViewPreferences};

fn reduction(job: &ImageJob) -> f64 {
    job.compressed_size()
        .map(|compressed| reduction_ratio(job.original_size(), compressed))
        .unwrap_or(0.0)
}

fn compare(key: SortKey, a: &ImageJob, b: &ImageJob) -> Ordering {
    match key {
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Size => a.original_size().cmp(&b.original_size()),
        SortKey::Reduction => reduction(a).total_cmp(&reduction(b)),
        SortKey::Status => a.status().cmp(&b.status()),
    }
}

/// Sorts in place. Descending is the exact reverse of ascending, ties
/// included.
pub fn sort_jobs(jobs: &mut [&ImageJob], key: SortKey, order: SortOrder) {
    jobs.sort_by(|a, b| compare(key, a, b));
    if order == SortOrder::Desc {
        jobs.reverse();
    }
}

/// The filtered, ordered jobs to render.
pub fn visible<'a>(registry: &'a JobRegistry, prefs: &ViewPreferences) -> Vec<&'a ImageJob> {
    let mut jobs: Vec<&ImageJob> = registry
        .iter()
        .filter(|job| prefs.filter.matches(job.status()))
        .collect();
    sort_jobs(&mut jobs, prefs.sort_by, prefs.sort_order);
    jobs
}
