//! Property-based tests for view derivation and stats aggregation.
//!
//! Uses proptest to verify:
//! 1. A derived view is always a subset of the collection, with ties
//!    under the sort key keeping their collection order.
//! 2. The status filters partition the collection as expected.
//! 3. Stats counters are internally consistent and rates stay in
//!    0..=100 for any collection.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use taskflow::sync::{SortKey, StatusFilter, ViewParams, compute_stats, derive_view};
use taskflow_proto::task::{Priority, Task};

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
    ]
}

/// ISO-8601 timestamps within a single year so lexical order is
/// chronological order.
fn arb_timestamp() -> impl Strategy<Value = String> {
    (1u32..=12, 1u32..=28, 0u32..24, 0u32..60)
        .prop_map(|(m, d, h, min)| format!("2026-{m:02}-{d:02}T{h:02}:{min:02}:00Z"))
}

fn arb_task(id: i64) -> impl Strategy<Value = Task> {
    (
        "[a-zA-Z ]{1,20}",
        prop::option::of("[a-z ]{0,30}"),
        any::<bool>(),
        prop::option::of(arb_priority()),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
        arb_timestamp(),
    )
        .prop_map(
            move |(title, description, completed, priority, starred, tags, created_at)| Task {
                id,
                title,
                description,
                completed,
                user_id: 1,
                priority,
                starred,
                tags,
                due_date: None,
                created_at: created_at.clone(),
                updated_at: created_at,
            },
        )
}

/// A collection with distinct ids and arbitrary field combinations.
fn arb_collection() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_task(0), 0..20).prop_map(|mut tasks| {
        for (i, task) in tasks.iter_mut().enumerate() {
            task.id = i as i64 + 1;
        }
        tasks
    })
}

fn arb_sort() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Newest),
        Just(SortKey::Oldest),
        Just(SortKey::Title),
        Just(SortKey::Priority),
    ]
}

fn arb_filter() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![
        Just(StatusFilter::All),
        Just(StatusFilter::Active),
        Just(StatusFilter::Completed),
        Just(StatusFilter::Starred),
        Just(StatusFilter::HighPriority),
    ]
}

/// Collection index of a task, by id.
fn position(tasks: &[Task], id: i64) -> usize {
    tasks
        .iter()
        .position(|t| t.id == id)
        .expect("view task must come from the collection")
}

// --- Properties ---

proptest! {
    #[test]
    fn view_is_a_subset_of_the_collection(
        tasks in arb_collection(),
        query in "[a-z]{0,3}",
        filter in arb_filter(),
        sort in arb_sort(),
    ) {
        let params = ViewParams { query, filter, sort };
        let view = derive_view(&tasks, &params);
        prop_assert!(view.len() <= tasks.len());
        for task in view {
            prop_assert!(tasks.iter().any(|t| t.id == task.id));
        }
    }

    #[test]
    fn ties_keep_collection_order(tasks in arb_collection(), sort in arb_sort()) {
        let params = ViewParams { sort, ..ViewParams::default() };
        let view = derive_view(&tasks, &params);
        for pair in view.windows(2) {
            let equal = match sort {
                SortKey::Newest | SortKey::Oldest => pair[0].created_at == pair[1].created_at,
                SortKey::Title => {
                    pair[0].title.to_lowercase() == pair[1].title.to_lowercase()
                }
                SortKey::Priority => pair[0].priority() == pair[1].priority(),
            };
            if equal {
                prop_assert!(
                    position(&tasks, pair[0].id) < position(&tasks, pair[1].id),
                    "equal-key neighbors out of collection order"
                );
            }
        }
    }

    #[test]
    fn sort_only_reorders(tasks in arb_collection(), sort in arb_sort()) {
        let params = ViewParams { sort, ..ViewParams::default() };
        let view = derive_view(&tasks, &params);
        prop_assert_eq!(view.len(), tasks.len());
    }

    #[test]
    fn active_and_completed_partition_the_collection(tasks in arb_collection()) {
        let active = derive_view(&tasks, &ViewParams {
            filter: StatusFilter::Active,
            ..ViewParams::default()
        });
        let completed = derive_view(&tasks, &ViewParams {
            filter: StatusFilter::Completed,
            ..ViewParams::default()
        });
        prop_assert_eq!(active.len() + completed.len(), tasks.len());
        prop_assert!(active.iter().all(|t| !t.completed));
        prop_assert!(completed.iter().all(|t| t.completed));
    }

    #[test]
    fn a_longer_query_never_widens_the_view(
        tasks in arb_collection(),
        query in "[a-z]{1,4}",
    ) {
        let narrow = derive_view(&tasks, &ViewParams {
            query: query.clone(),
            ..ViewParams::default()
        });
        let wide = derive_view(&tasks, &ViewParams {
            query: query[..query.len() - 1].to_string(),
            ..ViewParams::default()
        });
        prop_assert!(narrow.len() <= wide.len());
    }

    #[test]
    fn query_matches_are_real(tasks in arb_collection(), query in "[a-z]{1,3}") {
        let view = derive_view(&tasks, &ViewParams {
            query: query.clone(),
            ..ViewParams::default()
        });
        for task in view {
            let hit = task.title.to_lowercase().contains(&query)
                || task.description().to_lowercase().contains(&query)
                || task.tags().iter().any(|t| t.to_lowercase().contains(&query));
            prop_assert!(hit, "task {} does not match {query:?}", task.id);
        }
    }

    #[test]
    fn stats_counters_are_consistent(tasks in arb_collection()) {
        let stats = compute_stats(&tasks);
        prop_assert_eq!(stats.total, tasks.len());
        prop_assert_eq!(stats.active + stats.completed, stats.total);
        prop_assert_eq!(
            stats.low_priority + stats.medium_priority + stats.high_priority,
            stats.total
        );
        prop_assert!(stats.completion_rate <= 100);
        prop_assert!(stats.productivity_score <= 100);
    }

    #[test]
    fn stats_match_the_filtered_views(tasks in arb_collection()) {
        let stats = compute_stats(&tasks);
        let starred = derive_view(&tasks, &ViewParams {
            filter: StatusFilter::Starred,
            ..ViewParams::default()
        });
        let high = derive_view(&tasks, &ViewParams {
            filter: StatusFilter::HighPriority,
            ..ViewParams::default()
        });
        prop_assert_eq!(stats.starred, starred.len());
        prop_assert_eq!(stats.high_priority, high.len());
    }
}
