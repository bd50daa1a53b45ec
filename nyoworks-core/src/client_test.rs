#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::client::ProjectClient;
    use crate::clock::ManualClock;
    use crate::error::NyoError;
    use crate::infrastructure::StateStore;
    use crate::infrastructure_in_memory::InMemoryStateStore;
    use crate::infrastructure_json::JsonFileStore;
    use crate::types::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn client_with(config: LeaseConfig) -> ProjectClient<InMemoryStateStore, ManualClock> {
        let client =
            ProjectClient::with_clock(InMemoryStateStore::new(), ManualClock::new(t0()), config);
        client.init("Acme", None).unwrap();
        client
    }

    fn client() -> ProjectClient<InMemoryStateStore, ManualClock> {
        client_with(LeaseConfig::default())
    }

    fn add_task(client: &ProjectClient<InMemoryStateStore, ManualClock>, title: &str) -> Task {
        client
            .create_task(NewTask {
                title: title.to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    // =========================================================================
    // Lease scenarios
    // =========================================================================

    #[test]
    fn claim_conflict_then_supersede_after_expiry() {
        let client = client();
        add_task(&client, "Build API");

        let lease = client.claim("TASK-001", Some("backend-agent")).unwrap();
        assert_eq!(lease.expires_at, t0() + Duration::minutes(30));

        client.clock().advance(Duration::minutes(5));
        match client.claim("TASK-001", Some("qa-agent")) {
            Err(NyoError::Conflict { holder, .. }) => assert_eq!(holder, "backend-agent"),
            other => panic!("Expected Conflict, got {other:?}"),
        }

        client.clock().set(t0() + Duration::minutes(31));
        let lease = client.claim("TASK-001", Some("qa-agent")).unwrap();
        assert_eq!(lease.holder, "qa-agent");
        assert_eq!(lease.acquired_at, t0() + Duration::minutes(31));

        let listed = client.list_active().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].holder, "qa-agent");
    }

    #[test]
    fn claim_then_list_round_trip() {
        let client = client();
        add_task(&client, "Schema");

        client.claim("TASK-001", Some("db-agent")).unwrap();
        let listed = client.list_active().unwrap();
        let lease = listed.iter().find(|l| l.task_id == "TASK-001").unwrap();
        assert_eq!(lease.holder, "db-agent");
        assert_eq!(lease.expires_at, lease.acquired_at + Duration::minutes(30));
    }

    #[test]
    fn holder_defaults_to_manual() {
        let client = client();
        add_task(&client, "Schema");
        assert_eq!(client.claim("TASK-001", None).unwrap().holder, DEFAULT_HOLDER);
    }

    #[test]
    fn release_of_unlocked_task_fails() {
        let client = client();
        add_task(&client, "Schema");
        assert!(matches!(client.release("TASK-001", None), Err(NyoError::NotLocked(_))));

        client.claim("TASK-001", None).unwrap();
        client.release("TASK-001", None).unwrap();
        assert!(matches!(client.release("TASK-001", None), Err(NyoError::NotLocked(_))));
    }

    #[test]
    fn force_unlock_lets_another_holder_claim() {
        let client = client();
        add_task(&client, "Schema");
        client.claim("TASK-001", Some("A")).unwrap();
        client.force_unlock("TASK-001").unwrap();
        assert_eq!(client.claim("TASK-001", Some("B")).unwrap().holder, "B");
        assert!(matches!(client.force_unlock("TASK-002"), Err(NyoError::NotLocked(_))));
    }

    #[test]
    fn strict_mode_guards_release_but_not_force_unlock() {
        let client = client_with(LeaseConfig {
            ownership: OwnershipMode::Strict,
            ..LeaseConfig::default()
        });
        add_task(&client, "Schema");
        client.claim("TASK-001", Some("A")).unwrap();

        assert!(matches!(
            client.release("TASK-001", Some("B")),
            Err(NyoError::NotHolder { .. })
        ));
        assert_eq!(client.list_active().unwrap().len(), 1);

        client.force_unlock("TASK-001").unwrap();
        assert!(client.list_active().unwrap().is_empty());
    }

    #[test]
    fn unknown_task_is_rejected_unless_allowed() {
        let strict = client();
        assert!(matches!(
            strict.claim("TASK-404", None),
            Err(NyoError::TaskNotFound(_))
        ));
        assert!(strict.list_active().unwrap().is_empty());

        let lenient = client_with(LeaseConfig {
            require_known_task: false,
            ..LeaseConfig::default()
        });
        assert!(lenient.claim("TASK-404", None).is_ok());
    }

    #[test]
    fn expired_leases_stay_listed_until_pruned() {
        let client = client();
        add_task(&client, "a");
        add_task(&client, "b");
        client.claim("TASK-001", Some("x")).unwrap();
        client.clock().advance(Duration::minutes(20));
        client.claim("TASK-002", Some("y")).unwrap();
        client.clock().advance(Duration::minutes(15));

        let now = client.now();
        let listed = client.list_active().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].is_expired(now));
        assert!(!listed[1].is_expired(now));

        let pruned = client.prune_expired().unwrap();
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].task_id, "TASK-001");
        assert_eq!(client.summary().unwrap().locks, 1);
    }

    #[test]
    fn failed_operations_do_not_write() {
        let client = client();
        add_task(&client, "a");
        client.claim("TASK-001", Some("x")).unwrap();
        let before = client.state().unwrap();

        let _ = client.claim("TASK-001", Some("y"));
        let _ = client.set_phase("NOPE");
        let _ = client.enable_feature("nope");

        assert_eq!(client.state().unwrap(), before);
    }

    #[test]
    fn operations_without_project_report_no_project() {
        let client = ProjectClient::with_clock(
            InMemoryStateStore::new(),
            ManualClock::new(t0()),
            LeaseConfig::default(),
        );
        assert!(matches!(client.claim("TASK-001", None), Err(NyoError::NoProject)));
        assert!(matches!(client.list_active(), Err(NyoError::NoProject)));
        assert!(matches!(client.summary(), Err(NyoError::NoProject)));
    }

    #[test]
    fn init_twice_fails() {
        let client = client();
        assert!(matches!(
            client.init("Again", None),
            Err(NyoError::AlreadyInitialized(_))
        ));
    }

    // =========================================================================
    // Cross-process races over the JSON file store
    // =========================================================================

    fn json_client(dir: &std::path::Path, require_known_task: bool) -> ProjectClient<JsonFileStore> {
        ProjectClient::new(
            JsonFileStore::open(dir),
            LeaseConfig {
                require_known_task,
                ..LeaseConfig::default()
            },
        )
    }

    #[test]
    fn racing_claims_have_exactly_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        json_client(dir.path(), false).init("Race", None).unwrap();

        let contenders = 8;
        let barrier = Arc::new(Barrier::new(contenders));
        let handles: Vec<_> = (0..contenders)
            .map(|i| {
                let path = dir.path().to_path_buf();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    // Separate store instances behave like separate processes.
                    let client = json_client(&path, false);
                    barrier.wait();
                    client.claim("TASK-001", Some(&format!("agent-{i}")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, NyoError::Conflict { .. }))
        );

        let listed = json_client(dir.path(), false).list_active().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].holder, winners[0].holder);
    }

    #[test]
    fn concurrent_unrelated_writes_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        json_client(dir.path(), true).init("Race", None).unwrap();

        let writers = 6;
        let barrier = Arc::new(Barrier::new(writers));
        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let path = dir.path().to_path_buf();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let client = json_client(&path, true);
                    barrier.wait();
                    client
                        .create_task(NewTask {
                            title: format!("task {i}"),
                            ..Default::default()
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let client = json_client(dir.path(), true);
        let tasks = client.list_tasks(&TaskFilter::default()).unwrap();
        assert_eq!(tasks.len(), writers);
        let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), writers);
        crate::lock::FileLock::acquire(client.store().lock_path(), std::time::Duration::ZERO).unwrap();
    }

    #[test]
    fn file_store_persists_across_clients() {
        let dir = tempfile::tempdir().unwrap();
        let first = json_client(dir.path(), false);
        first.init("Persist", Some("PST")).unwrap();
        first.claim("TASK-007", Some("ops")).unwrap();
        drop(first);

        let second = json_client(dir.path(), false);
        let state = second.store().load().unwrap().unwrap();
        assert_eq!(state.code, "PST");
        assert_eq!(state.task_locks.get("TASK-007").unwrap().holder, "ops");
    }
}
