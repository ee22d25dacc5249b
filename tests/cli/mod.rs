use assert_cmd::prelude::*; // Add methods on commands
use serde_json::{json, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output}; // Run programs
use tempfile::{Builder, TempDir};

mod commands;

const TEST_CONFIG_FILE: &str = "dyntable-test.toml";

fn setup_temp_config_and_data_dir() -> std::io::Result<TempDir> {
    let temp_dir = Builder::new()
        .prefix("dyntable-test-dir")
        .rand_bytes(5)
        .tempdir()?;

    let file_path = temp_dir.path().join(TEST_CONFIG_FILE);
    let mut conf_file = File::create(file_path)?;

    let dsn = Path::new(&temp_dir.path().display().to_string())
        .join("dyntable.sqlite")
        .to_str()
        .unwrap()
        .to_string();

    let config_str = format!(
        r#"
[catalog]
type = "sqlite"
dsn = "{}"
"#,
        dsn.escape_default(),
    );

    write!(conf_file, "{config_str}")?;
    Ok(temp_dir)
}

fn dyntable(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::cargo_bin("dyntable")
        .expect("dyntable bin exists")
        .arg("-c")
        .arg(temp_dir.path().join(TEST_CONFIG_FILE))
        .args(args)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
