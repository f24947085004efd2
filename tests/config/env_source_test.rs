//! `.env` loading and lookup precedence.

use std::collections::BTreeMap;

use homework_bot::config::EnvSource;

#[test]
fn loads_dotenv_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        "HOMEWORK_BOT_TEST_ONLY_TOKEN=from-file\nHOMEWORK_BOT_TEST_ONLY_CHAT=99\n",
    )
    .expect("write");

    let env = EnvSource::load(&path).expect("load");
    assert_eq!(
        env.get("HOMEWORK_BOT_TEST_ONLY_TOKEN").as_deref(),
        Some("from-file")
    );
    assert_eq!(env.get("HOMEWORK_BOT_TEST_ONLY_CHAT").as_deref(), Some("99"));
}

#[test]
fn missing_dotenv_file_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env = EnvSource::load(&dir.path().join(".env")).expect("load");
    assert_eq!(env.get("HOMEWORK_BOT_TEST_ONLY_ABSENT"), None);
}

#[test]
fn process_env_wins_over_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    // PATH is set in any test environment.
    std::fs::write(&path, "PATH=from-file\n").expect("write");

    let env = EnvSource::load(&path).expect("load");
    assert_ne!(env.get("PATH").as_deref(), Some("from-file"));
}

#[test]
fn from_map_ignores_process_env() {
    let env = EnvSource::from_map(BTreeMap::new());
    assert_eq!(env.get("PATH"), None);
}

#[test]
fn debug_output_hides_values() {
    let mut vars = BTreeMap::new();
    vars.insert("PRACTICUM_TOKEN".to_owned(), "super-secret".to_owned());
    let rendered = format!("{:?}", EnvSource::from_map(vars));
    assert!(rendered.contains("PRACTICUM_TOKEN"));
    assert!(!rendered.contains("super-secret"));
}
