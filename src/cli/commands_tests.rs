use super::*;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

/// Write a single-sheet workbook; numeric-looking cells become numbers
fn write_workbook(path: &Path, sheet: &str, rows: &[&[&str]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell.parse::<f64>() {
                Ok(n) => worksheet.write_number(r as u32, c as u16, n).unwrap(),
                Err(_) => worksheet.write_string(r as u32, c as u16, *cell).unwrap(),
            };
        }
    }
    workbook.save(path).unwrap();
}

fn users_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("users.xlsx");
    write_workbook(
        &path,
        "Sheet1",
        &[
            &["id", "name", "surname", "email", "created_at"],
            &["1", "Ann", "Lee", "ann@example.com", "2024-01-01"],
            &["2", "Bob", "Ray", "bob@example.com", "2024-01-02"],
            &["3", "Ann", "Lee", "ann@example.com", "2024-02-01"],
        ],
    );
    path
}

fn args(input: PathBuf) -> RunArgs {
    RunArgs {
        input,
        ..RunArgs::default()
    }
}

// =========================================================================
// RunConfig Tests
// =========================================================================

#[test]
fn test_from_args_requires_a_mode() {
    let result = RunConfig::from_args(args(PathBuf::from("in.xlsx")));
    match result {
        Err(Xls2JsonError::Configuration(msg)) => assert!(msg.contains("required"), "got: {msg}"),
        other => panic!("Expected Configuration error, got {other:?}"),
    }

    // a unique key alone does not select a mode
    let result = RunConfig::from_args(RunArgs {
        unique_key: Some("email".to_string()),
        ..args(PathBuf::from("in.xlsx"))
    });
    assert!(matches!(result, Err(Xls2JsonError::Configuration(_))));
}

#[test]
fn test_from_args_labels_mode() {
    let config = RunConfig::from_args(RunArgs {
        mapping_labels: Some(vec!["id".to_string(), "email".to_string()]),
        ..args(PathBuf::from("in.xlsx"))
    })
    .unwrap();
    assert_eq!(config.sheet, DEFAULT_SHEET);
    assert_eq!(
        config.mode,
        Mode::Labels(vec!["id".to_string(), "email".to_string()])
    );
    assert_eq!(config.unique_key, None);
    assert_eq!(config.password, None);
    assert!(config.output.is_none());
    assert!(!config.pretty);
}

#[test]
fn test_from_args_template_has_no_default_unique_key() {
    let config = RunConfig::from_args(RunArgs {
        template: Some(PathBuf::from("t.json")),
        ..args(PathBuf::from("in.xlsx"))
    })
    .unwrap();
    assert_eq!(config.mode, Mode::Template(PathBuf::from("t.json")));
    assert_eq!(config.unique_key, None);
}

#[test]
fn test_from_args_unique_key_index() {
    let config = RunConfig::from_args(RunArgs {
        mapping_labels: Some(vec!["id".to_string()]),
        unique_key: Some("0".to_string()),
        ..args(PathBuf::from("in.xlsx"))
    })
    .unwrap();
    assert_eq!(config.unique_key, Some(ColumnSelector::Index(0)));
}

#[test]
fn test_from_args_modes_are_exclusive() {
    let result = RunConfig::from_args(RunArgs {
        template: Some(PathBuf::from("t.json")),
        column: Some("email".to_string()),
        ..args(PathBuf::from("in.xlsx"))
    });
    assert!(matches!(result, Err(Xls2JsonError::Configuration(_))));
}

#[test]
fn test_from_args_column_rejects_unique_key() {
    let result = RunConfig::from_args(RunArgs {
        column: Some("email".to_string()),
        unique_key: Some("id".to_string()),
        ..args(PathBuf::from("in.xlsx"))
    });
    assert!(matches!(result, Err(Xls2JsonError::Configuration(_))));
}

#[test]
fn test_from_args_keeps_password() {
    let config = RunConfig::from_args(RunArgs {
        password: Some("secret".to_string()),
        column: Some("email".to_string()),
        ..args(PathBuf::from("in.xlsx"))
    })
    .unwrap();
    assert_eq!(config.password.as_deref(), Some("secret"));
}

// =========================================================================
// convert / run Tests
// =========================================================================

#[test]
fn test_convert_labels_dedup_by_email() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::from_args(RunArgs {
        mapping_labels: Some(
            ["id", "name", "surname", "email", "created_at"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
        ),
        unique_key: Some("email".to_string()),
        ..args(users_workbook(&dir))
    })
    .unwrap();

    let (json, count) = convert(&config).unwrap();
    assert_eq!(count, 2);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"id": "3", "name": "Ann", "surname": "Lee", "email": "ann@example.com", "created_at": "2024-02-01"},
            {"id": "2", "name": "Bob", "surname": "Ray", "email": "bob@example.com", "created_at": "2024-01-02"},
        ])
    );
}

#[test]
fn test_convert_wrong_password_is_workbook_error() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::from_args(RunArgs {
        password: Some("secret".to_string()),
        mapping_labels: Some(vec!["id".to_string()]),
        ..args(users_workbook(&dir))
    })
    .unwrap();

    // users.xlsx is a plain zip package, not an encrypted container
    assert!(matches!(
        convert(&config),
        Err(Xls2JsonError::Workbook(_))
    ));
}

#[test]
fn test_convert_template_file() {
    let dir = TempDir::new().unwrap();
    let template_path = dir.path().join("template.json");
    std::fs::write(
        &template_path,
        r#"{"code": "U{id:03d}", "person": {"full": "{name} {surname}"}, "row": "{_row_number}"}"#,
    )
    .unwrap();

    let config = RunConfig::from_args(RunArgs {
        template: Some(template_path),
        ..args(users_workbook(&dir))
    })
    .unwrap();
    let (json, count) = convert(&config).unwrap();
    assert_eq!(count, 3);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["code"], "U001");
    assert_eq!(value[1]["person"]["full"], "Bob Ray");
    assert_eq!(value[2]["row"], "3");
}

#[test]
fn test_convert_column_mode() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::from_args(RunArgs {
        column: Some("name".to_string()),
        ..args(users_workbook(&dir))
    })
    .unwrap();
    let (json, count) = convert(&config).unwrap();
    assert_eq!(count, 2);
    assert_eq!(json, r#"["Ann","Bob"]"#);
}

#[test]
fn test_convert_sheet_not_found() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig::from_args(RunArgs {
        sheet: Some("Missing".to_string()),
        ..args(users_workbook(&dir))
    })
    .unwrap();
    match convert(&config) {
        Err(Xls2JsonError::SheetNotFound { name, available }) => {
            assert_eq!(name, "Missing");
            assert_eq!(available, vec!["Sheet1".to_string()]);
        }
        other => panic!("Expected SheetNotFound, got {other:?}"),
    }
}

#[test]
fn test_convert_bad_template_fails_before_opening_workbook() {
    let dir = TempDir::new().unwrap();
    let template_path = dir.path().join("template.json");
    std::fs::write(&template_path, r#"{"a": "{unclosed"}"#).unwrap();

    let config = RunConfig::from_args(RunArgs {
        template: Some(template_path),
        ..args(dir.path().join("missing.xlsx"))
    })
    .unwrap();
    assert!(matches!(
        convert(&config),
        Err(Xls2JsonError::TemplateSyntax(_))
    ));
}

#[test]
fn test_run_missing_label_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.json");
    let config = RunConfig::from_args(RunArgs {
        mapping_labels: Some(vec!["id".to_string(), "phone".to_string()]),
        output: Some(output.clone()),
        ..args(users_workbook(&dir))
    })
    .unwrap();

    assert!(matches!(
        run(&config),
        Err(Xls2JsonError::LabelNotFound { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn test_run_writes_pretty_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.json");
    let config = RunConfig::from_args(RunArgs {
        mapping_labels: Some(vec!["id".to_string()]),
        output: Some(output.clone()),
        pretty: true,
        ..args(users_workbook(&dir))
    })
    .unwrap();

    run(&config).unwrap();
    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("[\n  {\n    \"id\": \"1\""));
}
