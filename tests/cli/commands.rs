use crate::cli::*;

#[test]
fn test_cli_table_lifecycle() -> std::io::Result<()> {
    let temp_dir = setup_temp_config_and_data_dir()?;

    // Every invocation is a separate process working on the same database file
    let created = stdout_json(&dyntable(
        &temp_dir,
        &[
            "create-table",
            "--name",
            "people",
            "--fields",
            r#"{"name": "string", "age": "integer"}"#,
        ],
    ));
    assert_eq!(
        created,
        json!({"id": 1, "name": "people", "schema": {"age": "integer", "name": "string"}})
    );

    let inserted = stdout_json(&dyntable(
        &temp_dir,
        &["insert-row", "--id", "1", "--values", r#"{"name": "Alice", "age": 30}"#],
    ));
    assert_eq!(inserted, json!({"id": 1, "name": "Alice", "age": 30}));

    let updated = stdout_json(&dyntable(
        &temp_dir,
        &[
            "update-table",
            "--id",
            "1",
            "--fields",
            r#"{"name": "string", "age": "string"}"#,
        ],
    ));
    assert_eq!(updated["modified"], json!({"age": "string"}));

    assert_eq!(
        stdout_json(&dyntable(&temp_dir, &["list-rows", "--id", "1"])),
        json!([{"id": 1, "name": "Alice", "age": "30"}])
    );
    assert_eq!(
        stdout_json(&dyntable(&temp_dir, &["get-table", "--id", "1"]))["schema"],
        json!({"age": "string", "name": "string"})
    );

    Ok(())
}

#[test]
fn test_cli_errors() -> std::io::Result<()> {
    let temp_dir = setup_temp_config_and_data_dir()?;

    let output = dyntable(&temp_dir, &["get-table", "--id", "3"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Table with ID 3 doesn't exist"));

    let output = dyntable(
        &temp_dir,
        &["create-table", "--name", "t", "--fields", r#"{"x": "float"}"#],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported type \"float\""));

    Ok(())
}

#[test]
fn test_cli_invalid_config() -> std::io::Result<()> {
    let temp_dir = setup_temp_config_and_data_dir()?;
    let config_path = temp_dir.path().join("broken.toml");
    std::fs::write(&config_path, "[catalog]\ntype = \"sqlite\"\n")?;

    let output = Command::cargo_bin("dyntable")
        .expect("dyntable bin exists")
        .arg("-c")
        .arg(&config_path)
        .args(["list-rows", "--id", "1"])
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing field `dsn`"));

    Ok(())
}
