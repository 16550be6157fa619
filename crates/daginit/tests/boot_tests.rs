mod common;

use common::{env, install_boot_script};
use daginit::{EV_LOG_STDERR, EV_LOG_STDOUT};
use tempfile::TempDir;

#[tokio::test]
async fn test_invalid_boolean_aborts_before_redirection() {
    let root = TempDir::new().unwrap();
    let paths = install_boot_script(root.path(), "exit 0");
    let env = env(
        root.path(),
        &[(EV_LOG_STDOUT, "true"), (EV_LOG_STDERR, "maybe")],
    );

    let err = daginit::boot_with_env(Some(root.path().join("absent.conf").as_path()), env)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), "configuration");
    assert!(!paths.log_dir().exists());
}

#[tokio::test]
async fn test_missing_boot_script_is_fatal() {
    let root = TempDir::new().unwrap();
    let env = env(root.path(), &[]);

    let err = daginit::boot_with_env(Some(root.path().join("absent.conf").as_path()), env)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), "launch");
    assert!(format!("{err}").contains("releases/9.9.9/elixir"));
}

#[tokio::test]
async fn test_child_exit_status_is_propagated() {
    let root = TempDir::new().unwrap();
    install_boot_script(root.path(), "exit 7");
    let env = env(root.path(), &[]);

    let reason = daginit::boot_with_env(Some(root.path().join("absent.conf").as_path()), env)
        .await
        .unwrap();
    assert_eq!(reason.exit_code(), 7);
}
