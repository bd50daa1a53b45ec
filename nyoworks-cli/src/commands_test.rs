#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::process::ExitCode;

    use nyoworks_core::NyoError;
    use nyoworks_core::ProjectClient;
    use nyoworks_core::types::LeaseConfig;

    use crate::commands::{self, Client};
    use crate::report;
    use crate::storage::open_backend;

    fn client(dir: &Path) -> Client {
        let backend = open_backend("json", dir).unwrap();
        ProjectClient::new(backend, LeaseConfig::default())
    }

    fn project_with_task(dir: &Path) -> Client {
        let client = client(dir);
        commands::init(&client, "Handlers", None).unwrap();
        commands::task_create(&client, "Build login".to_string(), None, None, Some("high")).unwrap();
        client
    }

    #[test]
    fn claim_conflict_names_holder_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let client = project_with_task(dir.path());

        commands::task_claim(&client, "TASK-001", Some("backend")).unwrap();
        let err = commands::task_claim(&client, "TASK-001", Some("frontend")).unwrap_err();

        match err.downcast_ref::<NyoError>() {
            Some(NyoError::Conflict { task_id, holder, .. }) => {
                assert_eq!(task_id, "TASK-001");
                assert_eq!(holder, "backend");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(format!("{:#}", err).contains("already claimed by backend"));
        assert!(report(&err) == ExitCode::FAILURE);
    }

    #[test]
    fn releasing_unlocked_task_fails() {
        let dir = tempfile::tempdir().unwrap();
        let client = project_with_task(dir.path());

        let err = commands::task_release(&client, "TASK-001", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NyoError>(),
            Some(NyoError::NotLocked(id)) if id == "TASK-001"
        ));
        assert!(report(&err) == ExitCode::FAILURE);

        commands::task_claim(&client, "TASK-001", None).unwrap();
        commands::task_release(&client, "TASK-001", None).unwrap();
        assert!(client.list_active().unwrap().is_empty());
    }

    #[test]
    fn commands_without_project_fail() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path());

        let err = commands::status(&client).unwrap_err();
        assert!(matches!(err.downcast_ref::<NyoError>(), Some(NyoError::NoProject)));
        assert!(report(&err) == ExitCode::FAILURE);
    }

    #[test]
    fn invalid_status_filter_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = project_with_task(dir.path());

        let err = commands::task_list(&client, Some("archived"), None).unwrap_err();
        assert!(matches!(err.downcast_ref::<NyoError>(), Some(NyoError::Validation(_))));
        commands::task_list(&client, Some("pending"), None).unwrap();
    }
}
