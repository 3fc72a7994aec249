//! Tests for reading the project files.

use super::common::*;
use crate::{
    error::RemoteErrorKind,
    forge::traits::MockForge,
    orchestrator::Snapshot,
    test_helpers::{CHANGELOG, LOCK, MANIFEST},
    vcs::MockVcs,
};

#[tokio::test]
async fn reads_project_files_from_default_branch() {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_get_file_content()
        .withf(|req| req.git_ref.as_deref() == Some("main"))
        .times(3)
        .returning(|req| match req.path.as_str() {
            MANIFEST_PATH => Ok(MANIFEST.to_string()),
            LOCK_PATH => Ok(LOCK.to_string()),
            CHANGELOG_PATH => Ok(CHANGELOG.to_string()),
            other => panic!("unexpected read of {other}"),
        });

    let (orchestrator, _) = create_test_orchestrator(
        mock_forge,
        MockVcs::new(),
        test_config().build().unwrap(),
    );

    let snapshot = orchestrator.read_snapshot().await.unwrap();

    assert_eq!(
        snapshot,
        Snapshot {
            manifest: MANIFEST.to_string(),
            lock: LOCK.to_string(),
            changelog: CHANGELOG.to_string(),
        }
    );
}

#[tokio::test]
async fn missing_project_file_fails_before_any_mutation() {
    let state = RemoteState::default()
        .with_branch("main", "main000")
        .with_file(MANIFEST_PATH, MANIFEST)
        .with_file(LOCK_PATH, LOCK);

    let (orchestrator, _) = create_test_orchestrator(
        state.mock_forge(),
        MockVcs::new(),
        test_config().build().unwrap(),
    );

    let err = orchestrator.run_raise().await.unwrap_err();

    assert_eq!(err.remote_kind(), Some(RemoteErrorKind::NotFound));
    assert!(err.to_string().contains(CHANGELOG_PATH));
    assert!(state.calls().is_empty());
}

#[tokio::test]
async fn lock_without_project_entry_fails_before_any_mutation() {
    let state = RemoteState::new().with_file(
        LOCK_PATH,
        r#"{"lockfileVersion": 3, "packages": {"projects/gadgets": {"version": "0.4.0"}}}"#,
    );

    let (orchestrator, _) = create_test_orchestrator(
        state.mock_forge(),
        MockVcs::new(),
        test_config().build().unwrap(),
    );

    let err = orchestrator.run_raise().await.unwrap_err();

    assert!(matches!(
        err,
        crate::error::ReleaseError::MissingProjectEntry { key } if key == "projects/widgets"
    ));
    assert!(state.calls().is_empty());
}
