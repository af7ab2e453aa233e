use predicates::prelude::*;
use std::fs;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_session(data_dir: &Path, role: &str, token: &str) {
    let dir = data_dir.join("session");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("token"), token).unwrap();
    fs::write(
        dir.join("user.json"),
        serde_json::json!({
            "id": "u1",
            "name": "Asha",
            "email": "asha@example.com",
            "role": role
        })
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn login_success_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": { "_id": "u1", "name": "Asha", "email": "asha@example.com", "role": "tenant" },
            "token": "tok123"
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--api-base-url",
        &server.uri(),
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "login",
        "--email",
        "asha@example.com",
        "--password-stdin",
    ]);
    cmd.write_stdin("hunter2\n");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("logged in as asha@example.com"));

    let token = fs::read_to_string(tmp.path().join("session/token")).unwrap();
    assert_eq!(token, "tok123");
    let user = fs::read_to_string(tmp.path().join("session/user.json")).unwrap();
    assert!(user.contains("asha@example.com"));
    assert!(user.contains("tenant"));
}

#[tokio::test]
async fn login_with_wrong_credentials_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--api-base-url",
        &server.uri(),
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "login",
        "--email",
        "asha@example.com",
        "--password",
        "wrong",
    ]);
    cmd.assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Invalid credentials"));

    assert!(!tmp.path().join("session/token").exists());
    assert!(!tmp.path().join("session/user.json").exists());
}

#[test]
fn login_against_unreachable_backend_is_terminal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--api-base-url",
        "http://127.0.0.1:9",
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "login",
        "--email",
        "asha@example.com",
        "--password",
        "pw",
    ]);
    cmd.assert().failure().code(4);
    assert!(!tmp.path().join("session/token").exists());
}

#[tokio::test]
async fn register_reports_role_but_does_not_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": { "_id": "u2", "name": "Omar", "email": "omar@example.com", "role": "owner" },
            "token": "tok456"
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--api-base-url",
        &server.uri(),
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "register",
        "--name",
        "Omar",
        "--email",
        "omar@example.com",
        "--password",
        "pw",
        "--role",
        "owner",
    ]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("registered omar@example.com as owner"));

    assert!(!tmp.path().join("session/token").exists());
    assert!(!tmp.path().join("session/user.json").exists());
}

#[test]
fn logout_removes_session_files() {
    let tmp = tempfile::tempdir().unwrap();
    seed_session(tmp.path(), "tenant", "tok123");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "logout",
    ]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("logged out"));

    assert!(!tmp.path().join("session/token").exists());
    assert!(!tmp.path().join("session/user.json").exists());
}

#[test]
fn whoami_reports_role_and_actions() {
    let tmp = tempfile::tempdir().unwrap();
    seed_session(tmp.path(), "owner", "tok123");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args([
        "--data-dir",
        &tmp.path().to_string_lossy(),
        "whoami",
        "--json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"owner\""))
        .stdout(predicate::str::contains("owner decide"));
}

#[test]
fn whoami_without_session_is_anonymous() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args(["--data-dir", &tmp.path().to_string_lossy(), "whoami"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn stale_user_file_without_token_reads_as_anonymous() {
    let tmp = tempfile::tempdir().unwrap();
    seed_session(tmp.path(), "tenant", "tok123");
    fs::remove_file(tmp.path().join("session/token")).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("rently");
    cmd.args(["--data-dir", &tmp.path().to_string_lossy(), "whoami"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}
