use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::sample::Index;

use pertnet::{
    analyze_network, level_resources, schedule_forward, schedule_from_deadline, Resource,
    SchedulingConfig, Task,
};

const RESOURCE_IDS: [&str; 3] = ["r0", "r1", "r2"];

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Random DAG: each task may depend only on tasks before it.
fn project_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (
            1i64..8,
            prop::collection::vec(any::<Index>(), 0..3),
            prop::collection::vec(0usize..RESOURCE_IDS.len(), 0..2),
        ),
        1..20,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (duration, deps, resources))| {
                let deps: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    deps.iter().map(|d| format!("t{}", d.index(i))).collect()
                };
                let resources: Vec<&str> = resources.iter().map(|&r| RESOURCE_IDS[r]).collect();
                Task::new(format!("t{}", i), format!("Task {}", i), duration)
                    .with_dependencies(deps)
                    .with_resources(resources)
            })
            .collect()
    })
}

fn resources() -> Vec<Resource> {
    RESOURCE_IDS.iter().map(|&id| Resource::new(id)).collect()
}

fn offset(date: NaiveDate) -> i64 {
    (date - anchor()).num_days()
}

proptest! {
    /// Slack is never negative and EF always follows from ES and duration.
    #[test]
    fn timings_are_consistent(tasks in project_strategy()) {
        let analysis = analyze_network(&tasks).unwrap();
        for (task, value) in tasks.iter().zip(&analysis.task_values) {
            prop_assert_eq!(&task.id, &value.id);
            prop_assert!(value.slack >= 0, "{} has slack {}", value.id, value.slack);
            prop_assert_eq!(value.ef, value.es + task.duration);
            prop_assert_eq!(value.lf, value.ls + task.duration);
            prop_assert_eq!(value.is_critical, value.slack == 0);
        }
    }

    /// Project duration is the largest EF and the LF of every sink.
    #[test]
    fn duration_matches_sinks(tasks in project_strategy()) {
        let analysis = analyze_network(&tasks).unwrap();
        let max_ef = analysis.task_values.iter().map(|v| v.ef).max().unwrap();
        prop_assert_eq!(analysis.project_duration, max_ef);

        for value in &analysis.task_values {
            let is_sink = !tasks.iter().any(|t| t.dependencies.contains(&value.id));
            if is_sink {
                prop_assert_eq!(value.lf, analysis.project_duration);
            }
        }
    }

    /// The critical path is a connected chain from day 0 to the project end.
    #[test]
    fn critical_path_is_a_tight_chain(tasks in project_strategy()) {
        let analysis = analyze_network(&tasks).unwrap();
        prop_assert!(!analysis.critical_tasks.is_empty());
        prop_assert!(!analysis.critical_path.is_empty());

        let first = analysis.task_value(&analysis.critical_path[0]).unwrap();
        prop_assert_eq!(first.es, 0);
        let last = analysis.task_value(analysis.critical_path.last().unwrap()).unwrap();
        prop_assert_eq!(last.ef, analysis.project_duration);

        for pair in analysis.critical_path.windows(2) {
            let next = tasks.iter().find(|t| t.id == pair[1]).unwrap();
            prop_assert!(next.dependencies.contains(&pair[0]));
            let (a, b) = (
                analysis.task_value(&pair[0]).unwrap(),
                analysis.task_value(&pair[1]).unwrap(),
            );
            prop_assert!(a.is_critical && b.is_critical);
            prop_assert_eq!(a.ef, b.es);
        }
    }

    /// Same input, same output.
    #[test]
    fn analysis_is_idempotent(tasks in project_strategy()) {
        prop_assert_eq!(analyze_network(&tasks).unwrap(), analyze_network(&tasks).unwrap());
    }

    /// Forward scheduling honours dependencies and never double-books a
    /// capacity-1 resource.
    #[test]
    fn forward_schedule_is_feasible(tasks in project_strategy()) {
        let result =
            schedule_forward(&tasks, &resources(), anchor(), &SchedulingConfig::default()).unwrap();

        for scheduled in &result.tasks {
            prop_assert!(scheduled.start >= anchor());
            prop_assert_eq!(
                (scheduled.end - scheduled.start).num_days() + 1,
                scheduled.task.duration
            );
            for dep in &scheduled.task.dependencies {
                let pred = result.task(dep).unwrap();
                prop_assert!(scheduled.start > pred.end);
            }
        }

        for (i, a) in result.allocations.iter().enumerate() {
            for b in &result.allocations[i + 1..] {
                if a.resource_id == b.resource_id && a.task_id != b.task_id {
                    prop_assert!(
                        a.end_date < b.start_date || b.end_date < a.start_date,
                        "{} and {} overlap on {}", a.task_id, b.task_id, a.resource_id
                    );
                }
            }
        }
    }

    /// Deadline scheduling ends exactly on the deadline.
    #[test]
    fn deadline_schedule_ends_on_deadline(tasks in project_strategy()) {
        let deadline = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let result =
            schedule_from_deadline(&tasks, &[], deadline, &SchedulingConfig::default()).unwrap();
        prop_assert_eq!(result.project_end, deadline);
        prop_assert!(result.tasks.iter().all(|t| t.start >= result.project_start));
    }

    /// Leveling keeps critical tasks in place, keeps moved tasks inside their
    /// slack window and never breaks a dependency.
    #[test]
    fn leveling_respects_criticality_and_slack(tasks in project_strategy()) {
        let analysis = analyze_network(&tasks).unwrap();
        let result =
            level_resources(&tasks, &resources(), anchor(), &SchedulingConfig::default()).unwrap();
        let schedule = &result.schedule;

        for value in &analysis.task_values {
            let start = offset(schedule.task(&value.id).unwrap().start);
            if value.is_critical {
                prop_assert_eq!(start, value.es);
            } else {
                prop_assert!(start >= value.es && start <= value.ls);
            }
        }

        for scheduled in &schedule.tasks {
            for dep in &scheduled.task.dependencies {
                prop_assert!(scheduled.start > schedule.task(dep).unwrap().end);
            }
        }
    }
}
