//! Pure view derivation over the canonical collection.
//!
//! Nothing here mutates or reorders the collection itself; callers
//! get a freshly derived vector of references every time. Timestamps
//! are ISO-8601 strings, so lexical comparison is chronological.

use taskflow_proto::task::{Priority, Task};

/// Status facet of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Starred,
    HighPriority,
}

impl StatusFilter {
    /// Cycle order used by the filter hotkey.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::Starred,
            Self::Starred => Self::HighPriority,
            Self::HighPriority => Self::All,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Starred => "starred",
            Self::HighPriority => "high priority",
        }
    }

    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Starred => task.starred(),
            Self::HighPriority => task.priority() == Priority::High,
        }
    }
}

/// Presentation order of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Title,
    Priority,
}

impl SortKey {
    /// Cycle order used by the sort hotkey.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Title,
            Self::Title => Self::Priority,
            Self::Priority => Self::Newest,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
            Self::Priority => "priority",
        }
    }
}

/// The full set of view parameters held by the UI.
#[derive(Debug, Clone, Default)]
pub struct ViewParams {
    /// Case-insensitive substring query over title, description and tags.
    pub query: String,
    pub filter: StatusFilter,
    pub sort: SortKey,
}

/// Derive the visible, ordered slice of the collection.
///
/// Search narrows first, then the status filter, then a stable sort.
/// Stability means tasks comparing equal keep their collection order,
/// so toggling the sort key back and forth cannot shuffle ties.
#[must_use]
pub fn derive_view<'a>(tasks: &'a [Task], params: &ViewParams) -> Vec<&'a Task> {
    let query = params.query.trim().to_lowercase();
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| query.is_empty() || matches_query(t, &query))
        .filter(|t| params.filter.accepts(t))
        .collect();
    match params.sort {
        SortKey::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Title => {
            view.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortKey::Priority => view.sort_by(|a, b| b.priority().rank().cmp(&a.priority().rank())),
    }
    view
}

fn matches_query(task: &Task, query: &str) -> bool {
    task.title.to_lowercase().contains(query)
        || task.description().to_lowercase().contains(query)
        || task.tags().iter().any(|t| t.to_lowercase().contains(query))
}

/// Aggregate counters over the whole collection, independent of the
/// current view parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Percentage of tasks completed, rounded to the nearest integer.
    pub completion_rate: u8,
    pub starred: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    /// Weighted score in 0..=100. Completed tasks count once, starred
    /// twice, high priority three times, against the total.
    pub productivity_score: u8,
}

/// Compute stats over the full collection.
///
/// Both rates are defined as 0 for an empty collection rather than a
/// division by zero.
#[must_use]
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let starred = tasks.iter().filter(|t| t.starred()).count();
    let high_priority = tasks
        .iter()
        .filter(|t| t.priority() == Priority::High)
        .count();
    let medium_priority = tasks
        .iter()
        .filter(|t| t.priority() == Priority::Medium)
        .count();
    let low_priority = tasks
        .iter()
        .filter(|t| t.priority() == Priority::Low)
        .count();

    let (completion_rate, productivity_score) = if total == 0 {
        (0, 0)
    } else {
        let rate = percent(completed as f64, total as f64);
        let weighted = (completed + 2 * starred + 3 * high_priority) as f64;
        let score = percent(weighted, total as f64).min(100);
        (rate, score)
    };

    TaskStats {
        total,
        completed,
        active: total - completed,
        completion_rate,
        starred,
        high_priority,
        medium_priority,
        low_priority,
        productivity_score,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(part: f64, whole: f64) -> u8 {
    (part / whole * 100.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: Some(String::new()),
            completed: false,
            user_id: 1,
            priority: Some(Priority::Medium),
            starred: Some(false),
            tags: Some(Vec::new()),
            due_date: None,
            created_at: format!("2026-08-30T10:00:{:02}Z", id),
            updated_at: format!("2026-08-30T10:00:{:02}Z", id),
        }
    }

    // --- search ---

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut a = task(1, "Write REPORT");
        a.description = Some("quarterly numbers".to_string());
        let mut b = task(2, "Groceries");
        b.tags = Some(vec!["Errands".to_string()]);
        let c = task(3, "Dentist");
        let tasks = vec![a, b, c];

        let by_title = derive_view(
            &tasks,
            &ViewParams {
                query: "report".to_string(),
                ..ViewParams::default()
            },
        );
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, 1);

        let by_desc = derive_view(
            &tasks,
            &ViewParams {
                query: "QUARTERLY".to_string(),
                ..ViewParams::default()
            },
        );
        assert_eq!(by_desc.len(), 1);

        let by_tag = derive_view(
            &tasks,
            &ViewParams {
                query: "errands".to_string(),
                ..ViewParams::default()
            },
        );
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].id, 2);
    }

    #[test]
    fn blank_query_matches_everything() {
        let tasks = vec![task(1, "A"), task(2, "B")];
        let view = derive_view(
            &tasks,
            &ViewParams {
                query: "   ".to_string(),
                ..ViewParams::default()
            },
        );
        assert_eq!(view.len(), 2);
    }

    // --- filters ---

    #[test]
    fn status_filters_partition_by_flag() {
        let mut done = task(1, "done");
        done.completed = true;
        let mut starred = task(2, "starred");
        starred.starred = Some(true);
        let mut urgent = task(3, "urgent");
        urgent.priority = Some(Priority::High);
        let plain = task(4, "plain");
        let tasks = vec![done, starred, urgent, plain];

        let ids = |filter| {
            derive_view(
                &tasks,
                &ViewParams {
                    filter,
                    sort: SortKey::Oldest,
                    ..ViewParams::default()
                },
            )
            .iter()
            .map(|t| t.id)
            .collect::<Vec<_>>()
        };
        assert_eq!(ids(StatusFilter::All), vec![1, 2, 3, 4]);
        assert_eq!(ids(StatusFilter::Active), vec![2, 3, 4]);
        assert_eq!(ids(StatusFilter::Completed), vec![1]);
        assert_eq!(ids(StatusFilter::Starred), vec![2]);
        assert_eq!(ids(StatusFilter::HighPriority), vec![3]);
    }

    #[test]
    fn filter_cycle_returns_to_start() {
        let mut f = StatusFilter::All;
        for _ in 0..5 {
            f = f.next();
        }
        assert_eq!(f, StatusFilter::All);
    }

    // --- sorting ---

    #[test]
    fn newest_sorts_descending_by_created_at() {
        let tasks = vec![task(1, "old"), task(3, "new"), task(2, "mid")];
        let view = derive_view(
            &tasks,
            &ViewParams {
                sort: SortKey::Newest,
                ..ViewParams::default()
            },
        );
        let ids: Vec<i64> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn title_sort_is_case_insensitive() {
        let tasks = vec![task(1, "banana"), task(2, "Apple"), task(3, "cherry")];
        let view = derive_view(
            &tasks,
            &ViewParams {
                sort: SortKey::Title,
                ..ViewParams::default()
            },
        );
        let titles: Vec<&str> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn priority_sort_is_high_to_low_and_stable() {
        let mut a = task(1, "a");
        a.priority = Some(Priority::Low);
        let mut b = task(2, "b");
        b.priority = Some(Priority::High);
        let c = task(3, "c");
        let d = task(4, "d");
        let tasks = vec![a, b, c, d];
        let view = derive_view(
            &tasks,
            &ViewParams {
                sort: SortKey::Priority,
                ..ViewParams::default()
            },
        );
        let ids: Vec<i64> = view.iter().map(|t| t.id).collect();
        // Ties (3 and 4, both medium) keep collection order.
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn search_filter_and_sort_compose() {
        let mut a = task(1, "ship release");
        a.priority = Some(Priority::High);
        let mut b = task(2, "ship docs");
        b.completed = true;
        let mut c = task(3, "ship fix");
        c.priority = Some(Priority::Low);
        let d = task(4, "unrelated");
        let tasks = vec![a, b, c, d];

        let view = derive_view(
            &tasks,
            &ViewParams {
                query: "ship".to_string(),
                filter: StatusFilter::Active,
                sort: SortKey::Priority,
            },
        );
        let ids: Vec<i64> = view.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    // --- stats ---

    #[test]
    fn stats_empty_collection_is_all_zeroes() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, TaskStats::default());
    }

    #[test]
    fn completion_rate_rounds_to_nearest() {
        let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
        tasks[0].completed = true;
        // 1/3 = 33.33 rounds to 33.
        assert_eq!(compute_stats(&tasks).completion_rate, 33);
        tasks[1].completed = true;
        // 2/3 = 66.67 rounds to 67.
        assert_eq!(compute_stats(&tasks).completion_rate, 67);
    }

    #[test]
    fn productivity_score_weights_and_caps() {
        // 4 tasks: 1 completed, 1 starred, 1 high priority.
        // (1 + 2 + 3) / 4 = 150% before the cap.
        let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c"), task(4, "d")];
        tasks[0].completed = true;
        tasks[1].starred = Some(true);
        tasks[2].priority = Some(Priority::High);
        assert_eq!(compute_stats(&tasks).productivity_score, 100);

        // 10 tasks, same contributors: (1 + 2 + 3) / 10 = 60.
        for id in 5..=10 {
            tasks.push(task(id, "filler"));
        }
        assert_eq!(compute_stats(&tasks).productivity_score, 60);
    }

    #[test]
    fn overlapping_flags_count_in_every_bucket() {
        // One task that is completed, starred and high priority
        // contributes to all three weights: (1 + 2 + 3) / 2 = 300%,
        // capped at 100.
        let mut a = task(1, "a");
        a.completed = true;
        a.starred = Some(true);
        a.priority = Some(Priority::High);
        let b = task(2, "b");
        let stats = compute_stats(&[a, b]);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.starred, 1);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.productivity_score, 100);
        assert_eq!(stats.completion_rate, 50);
    }

    #[test]
    fn priority_buckets_sum_to_total() {
        let mut a = task(1, "a");
        a.priority = Some(Priority::Low);
        let mut b = task(2, "b");
        b.priority = Some(Priority::High);
        let c = task(3, "c");
        let stats = compute_stats(&[a, b, c]);
        assert_eq!(stats.low_priority + stats.medium_priority + stats.high_priority, stats.total);
    }
}
