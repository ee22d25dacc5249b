use crate::service::*;

#[rstest]
#[case::memory(Backend::Memory)]
#[case::file(Backend::File)]
#[tokio::test]
async fn test_update_reports_changes(#[case] backend: Backend) {
    let (service, _temp_dir) = make_service(backend).await;
    let table = service
        .create_table(
            "t",
            schema(&[("x", FieldType::Integer), ("y", FieldType::String)]),
        )
        .await
        .unwrap();
    service
        .insert_row(table.id, &values(json!({"x": 1, "y": "yes"})))
        .await
        .unwrap();

    let new_schema = schema(&[
        ("x", FieldType::Integer),
        ("y", FieldType::Boolean),
        ("z", FieldType::Integer),
    ]);
    let summary = service
        .update_table(table.id, new_schema.clone())
        .await
        .unwrap();

    assert_eq!(summary.changes.added, schema(&[("z", FieldType::Integer)]));
    assert!(summary.changes.deleted.is_empty());
    assert_eq!(summary.changes.modified, schema(&[("y", FieldType::Boolean)]));
    assert_eq!(summary.schema, new_schema);
    assert_eq!(service.get_table(table.id).await.unwrap().schema, new_schema);

    assert_eq!(
        service.list_rows(table.id).await.unwrap(),
        vec![record(
            1,
            &[
                ("x", FieldValue::Integer(1)),
                ("y", FieldValue::Boolean(true)),
                ("z", FieldValue::Null),
            ]
        )]
    );
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::file(Backend::File)]
#[tokio::test]
async fn test_incompatible_update_keeps_schema(#[case] backend: Backend) {
    let (service, _temp_dir) = make_service(backend).await;
    let original = schema(&[("age", FieldType::String)]);
    let table = service.create_table("t", original.clone()).await.unwrap();
    service
        .insert_row(table.id, &values(json!({"age": "12"})))
        .await
        .unwrap();
    service
        .insert_row(table.id, &values(json!({"age": "unknown"})))
        .await
        .unwrap();

    let err = service
        .update_table(
            table.id,
            schema(&[("age", FieldType::Integer), ("extra", FieldType::Boolean)]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "age cannot be migrated from string to integer");
    assert!(matches!(
        err,
        TableError::IncompatibleAlteration {
            from_type: FieldType::String,
            to_type: FieldType::Integer,
            ..
        }
    ));

    assert_eq!(service.get_table(table.id).await.unwrap().schema, original);
    assert_eq!(
        service.list_rows(table.id).await.unwrap(),
        vec![
            record(1, &[("age", FieldValue::String("12".to_string()))]),
            record(2, &[("age", FieldValue::String("unknown".to_string()))]),
        ]
    );

    // The column added in the failed batch was rolled back too
    let summary = service
        .update_table(
            table.id,
            schema(&[("age", FieldType::String), ("extra", FieldType::Boolean)]),
        )
        .await
        .unwrap();
    assert_eq!(summary.changes.added, schema(&[("extra", FieldType::Boolean)]));
}

#[tokio::test]
async fn test_update_without_changes() {
    let (service, _) = make_service(Backend::Memory).await;
    let fields = schema(&[("x", FieldType::Integer)]);
    let table = service.create_table("t", fields.clone()).await.unwrap();

    let summary = service.update_table(table.id, fields.clone()).await.unwrap();

    assert!(summary.changes.is_empty());
    assert_eq!(summary.schema, fields);
}

#[tokio::test]
async fn test_update_deletes_columns() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table(
            "t",
            schema(&[("keep", FieldType::Integer), ("drop_me", FieldType::String)]),
        )
        .await
        .unwrap();
    service
        .insert_row(table.id, &values(json!({"keep": 7, "drop_me": "bye"})))
        .await
        .unwrap();

    let summary = service
        .update_table(table.id, schema(&[("keep", FieldType::Integer)]))
        .await
        .unwrap();
    assert_eq!(
        summary.changes.deleted,
        schema(&[("drop_me", FieldType::String)])
    );

    assert_eq!(
        service.list_rows(table.id).await.unwrap(),
        vec![record(1, &[("keep", FieldValue::Integer(7))])]
    );
    assert!(matches!(
        service
            .insert_row(table.id, &values(json!({"keep": 8, "drop_me": "x"})))
            .await
            .unwrap_err(),
        TableError::UnknownField { .. }
    ));
}

#[tokio::test]
async fn test_conversions_keep_data() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table(
            "t",
            schema(&[
                ("count", FieldType::Integer),
                ("flag", FieldType::String),
                ("enabled", FieldType::Boolean),
            ]),
        )
        .await
        .unwrap();
    for (count, flag, enabled) in [(1234, "1", true), (-5, "no", false)] {
        service
            .insert_row(
                table.id,
                &values(json!({"count": count, "flag": flag, "enabled": enabled})),
            )
            .await
            .unwrap();
    }

    service
        .update_table(
            table.id,
            schema(&[
                ("count", FieldType::String),
                ("flag", FieldType::Boolean),
                ("enabled", FieldType::Integer),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(service.list_rows(table.id).await.unwrap()).unwrap(),
        json!([
            {"id": 1, "count": "1234", "flag": true, "enabled": 1},
            {"id": 2, "count": "-5", "flag": false, "enabled": 0},
        ])
    );
}

#[tokio::test]
async fn test_added_and_altered_columns_are_nullable() {
    let (service, _) = make_service(Backend::Memory).await;
    let table = service
        .create_table("t", schema(&[("x", FieldType::Integer)]))
        .await
        .unwrap();

    service
        .update_table(
            table.id,
            schema(&[("x", FieldType::String), ("y", FieldType::Boolean)]),
        )
        .await
        .unwrap();

    let row = service
        .insert_row(table.id, &values(json!({})))
        .await
        .unwrap();
    assert_eq!(
        row,
        record(1, &[("x", FieldValue::Null), ("y", FieldValue::Null)])
    );
}

#[tokio::test]
async fn test_update_errors() {
    let (service, _) = make_service(Backend::Memory).await;

    assert!(matches!(
        service
            .update_table(9, schema(&[("x", FieldType::Integer)]))
            .await
            .unwrap_err(),
        TableError::NotFound { id: 9 }
    ));

    let table = service
        .create_table("t", schema(&[("x", FieldType::Integer)]))
        .await
        .unwrap();
    assert!(matches!(
        service
            .update_table(table.id, schema(&[("id", FieldType::Integer)]))
            .await
            .unwrap_err(),
        TableError::Validation(ValidationError::ReservedFieldName { .. })
    ));
    assert_eq!(
        service.get_table(table.id).await.unwrap().schema,
        schema(&[("x", FieldType::Integer)])
    );
}
