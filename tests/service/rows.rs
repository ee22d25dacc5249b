use crate::service::*;

#[rstest]
#[case::memory(Backend::Memory)]
#[case::file(Backend::File)]
#[tokio::test]
async fn test_insert_then_list(#[case] backend: Backend) {
    let (service, _temp_dir) = make_service(backend).await;
    let table = service
        .create_table("t", schema(&[("x", FieldType::Integer)]))
        .await
        .unwrap();

    let row = service
        .insert_row(table.id, &values(json!({"x": 5})))
        .await
        .unwrap();
    assert_eq!(row, record(1, &[("x", FieldValue::Integer(5))]));

    assert_eq!(service.list_rows(table.id).await.unwrap(), vec![row.clone()]);

    // Unknown fields are rejected and nothing is written
    let err = service
        .insert_row(table.id, &values(json!({"x": 6, "nope": 1})))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::UnknownField { ref field } if field == "nope"));
    assert_eq!(service.list_rows(table.id).await.unwrap(), vec![row]);
}

#[tokio::test]
async fn test_insert_all_types_in_order() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table(
            "people",
            schema(&[
                ("admin", FieldType::Boolean),
                ("age", FieldType::Integer),
                ("name", FieldType::String),
            ]),
        )
        .await
        .unwrap();

    for (name, age, admin) in [("Alice", 30, true), ("Bob", 25, false), ("Carol", 41, false)] {
        service
            .insert_row(
                table.id,
                &values(json!({"name": name, "age": age, "admin": admin})),
            )
            .await
            .unwrap();
    }

    let rows = service.list_rows(table.id).await.unwrap();
    assert_eq!(
        rows.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        serde_json::to_value(&rows[1]).unwrap(),
        json!({"id": 2, "name": "Bob", "age": 25, "admin": false})
    );
}

#[tokio::test]
async fn test_unknown_field_reported_before_bad_values() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table("t", schema(&[("a", FieldType::Integer)]))
        .await
        .unwrap();

    // "a" sorts before "zzz" and has a value of the wrong type
    let err = service
        .insert_row(table.id, &values(json!({"a": "not-int", "zzz": 1})))
        .await
        .unwrap_err();
    assert!(
        matches!(err, TableError::UnknownField { ref field } if field == "zzz"),
        "unexpected error {err:?}"
    );
    assert_eq!(service.list_rows(table.id).await.unwrap(), vec![]);
}

#[tokio::test]
async fn test_insert_invalid_values() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table(
            "t",
            schema(&[("flag", FieldType::Boolean), ("label", FieldType::String)]),
        )
        .await
        .unwrap();

    assert!(matches!(
        service
            .insert_row(table.id, &values(json!({"flag": "yes", "label": "a"})))
            .await
            .unwrap_err(),
        TableError::Validation(ValidationError::TypeMismatch { .. })
    ));
    assert!(matches!(
        service
            .insert_row(
                table.id,
                &values(json!({"flag": true, "label": "a".repeat(201)}))
            )
            .await
            .unwrap_err(),
        TableError::Validation(ValidationError::StringTooLong { max: 200, .. })
    ));
    // Columns from the initial schema are NOT NULL
    assert!(matches!(
        service
            .insert_row(table.id, &values(json!({"flag": true})))
            .await
            .unwrap_err(),
        TableError::Validation(ValidationError::MissingValue { .. })
    ));
    assert!(matches!(
        service
            .insert_row(table.id, &values(json!({"flag": true, "label": null})))
            .await
            .unwrap_err(),
        TableError::Validation(ValidationError::MissingValue { .. })
    ));

    assert_eq!(service.list_rows(table.id).await.unwrap(), vec![]);
}

#[tokio::test]
async fn test_rows_of_missing_table() {
    let (service, _) = make_service(Backend::Memory).await;

    assert!(matches!(
        service
            .insert_row(42, &values(json!({"x": 1})))
            .await
            .unwrap_err(),
        TableError::NotFound { id: 42 }
    ));
    assert!(matches!(
        service.list_rows(42).await.unwrap_err(),
        TableError::NotFound { id: 42 }
    ));
}
