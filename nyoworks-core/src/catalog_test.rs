#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::error::NyoError;
    use crate::types::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn project() -> ProjectState {
        ProjectState::new("Acme Clinic", Some("acme"), now()).unwrap()
    }

    fn new_task(title: &str, feature: Option<&str>) -> NewTask {
        NewTask {
            title: title.to_string(),
            feature: feature.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn new_project_defaults() {
        let state = project();
        assert_eq!(state.code, "ACME");
        assert_eq!(state.phase, Phase::Discovery);
        assert!(state.tasks.is_empty());
        assert!(state.task_locks.is_empty());
    }

    #[test]
    fn project_code_is_derived_from_name() {
        let state = ProjectState::new("my shop 2", None, now()).unwrap();
        assert_eq!(state.code, "MYSHOP2");
        assert!(matches!(
            ProjectState::new("   ", None, now()),
            Err(NyoError::Validation(_))
        ));
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    #[test]
    fn task_ids_are_sequential_and_padded() {
        let mut state = project();
        let a = state.create_task(new_task("Schema", None), now()).unwrap();
        let b = state.create_task(new_task("API", None), now()).unwrap();
        assert_eq!(a.id, "TASK-001");
        assert_eq!(b.id, "TASK-002");
        assert_eq!(a.status, TaskStatus::Pending);
        assert_eq!(a.priority, Priority::Medium);
    }

    #[test]
    fn task_ids_continue_after_highest_existing() {
        let mut state = project();
        state.create_task(new_task("one", None), now()).unwrap();
        state.tasks[0].id = "TASK-041".to_string();
        let next = state.create_task(new_task("two", None), now()).unwrap();
        assert_eq!(next.id, "TASK-042");
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut state = project();
        assert!(matches!(
            state.create_task(new_task("  ", None), now()),
            Err(NyoError::Validation(_))
        ));
    }

    #[test]
    fn list_filters_by_status_and_feature() {
        let mut state = project();
        state.create_task(new_task("pay", Some("payments")), now()).unwrap();
        state.create_task(new_task("crm", Some("crm")), now()).unwrap();
        state.set_task_status("TASK-002", TaskStatus::InProgress, now()).unwrap();

        let by_feature = state.list_tasks(&TaskFilter {
            feature: Some("payments".to_string()),
            ..Default::default()
        });
        assert_eq!(by_feature.len(), 1);
        assert_eq!(by_feature[0].id, "TASK-001");

        let by_status = state.list_tasks(&TaskFilter {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        });
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].id, "TASK-002");

        assert_eq!(state.list_tasks(&TaskFilter::default()).len(), 2);
    }

    #[test]
    fn completing_sets_and_reopening_clears_completed_at() {
        let mut state = project();
        state.create_task(new_task("x", None), now()).unwrap();
        let later = now() + Duration::hours(2);

        let done = state.set_task_status("TASK-001", TaskStatus::Completed, later).unwrap();
        assert_eq!(done.completed_at, Some(later));
        assert_eq!(done.updated_at, later);

        let reopened = state.set_task_status("TASK-001", TaskStatus::Pending, later).unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[test]
    fn status_of_unknown_task_is_not_found() {
        let mut state = project();
        assert!(matches!(
            state.set_task_status("TASK-404", TaskStatus::Completed, now()),
            Err(NyoError::TaskNotFound(_))
        ));
    }

    // =========================================================================
    // Phase / features / decisions
    // =========================================================================

    #[test]
    fn phase_validation() {
        let mut state = project();
        assert_eq!(state.set_phase("BACKEND").unwrap(), Phase::Backend);
        assert_eq!(state.phase.to_index(), 3);

        let err = state.set_phase("LAUNCH").unwrap_err();
        assert!(matches!(err, NyoError::Validation(ref msg) if msg.contains("DISCOVERY")));
        assert_eq!(state.phase, Phase::Backend);
    }

    #[test]
    fn feature_enable_disable() {
        let mut state = project();
        assert!(state.enable_feature("payments").unwrap());
        assert!(!state.enable_feature("payments").unwrap());
        assert!(state.features().contains(&("payments", true)));
        assert!(state.features().contains(&("crm", false)));

        assert!(state.disable_feature("payments").unwrap());
        assert!(!state.disable_feature("payments").unwrap());
        assert!(state.enabled_features.is_empty());
    }

    #[test]
    fn unknown_feature_is_validation_error() {
        let mut state = project();
        assert!(matches!(state.enable_feature("blockchain"), Err(NyoError::Validation(_))));
        assert!(matches!(state.disable_feature("blockchain"), Err(NyoError::Validation(_))));
    }

    #[test]
    fn duplicate_decision_is_rejected() {
        let mut state = project();
        let input = NewDecision {
            id: "ADR-001".to_string(),
            title: "Use Postgres".to_string(),
            description: "Primary store".to_string(),
            rationale: "Team knows it".to_string(),
        };
        state.add_decision(input.clone(), now()).unwrap();
        assert!(matches!(
            state.add_decision(input, now()),
            Err(NyoError::Validation(_))
        ));
        assert_eq!(state.decisions.len(), 1);
    }

    #[test]
    fn summary_counts() {
        let mut state = project();
        state.create_task(new_task("a", None), now()).unwrap();
        state.create_task(new_task("b", None), now()).unwrap();
        state.set_task_status("TASK-002", TaskStatus::Completed, now()).unwrap();
        state.task_locks.claim("TASK-001", "a", now()).unwrap();
        state.task_locks.claim("TASK-XYZ", "b", now() - Duration::hours(1)).unwrap();
        state.enable_feature("crm").unwrap();

        let summary = state.summary(now());
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.in_progress, 0);
        assert_eq!(summary.locks, 2);
        assert_eq!(summary.live_locks, 1);
        assert_eq!(summary.enabled_features, vec!["crm".to_string()]);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut state = project();
        state.create_task(new_task("a", Some("cms")), now()).unwrap();
        state.task_locks.claim("TASK-001", "a", now()).unwrap();

        let json = serde_json::to_string_pretty(&state).unwrap();
        assert!(json.contains("\"phase\": \"DISCOVERY\""));
        assert!(json.contains("\"task_locks\""));
        let back: ProjectState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
