use crate::service::*;

#[tokio::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_table_lifecycle_postgres() {
    let (service, _) = make_service(Backend::Postgres).await;

    let table = service
        .create_table(
            "t",
            schema(&[("x", FieldType::Integer), ("y", FieldType::String)]),
        )
        .await
        .unwrap();
    assert_eq!(service.list_rows(table.id).await.unwrap(), vec![]);

    service
        .insert_row(table.id, &values(json!({"x": 5, "y": "true"})))
        .await
        .unwrap();

    let summary = service
        .update_table(
            table.id,
            schema(&[
                ("x", FieldType::Integer),
                ("y", FieldType::Boolean),
                ("z", FieldType::Integer),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(summary.changes.modified, schema(&[("y", FieldType::Boolean)]));

    assert_eq!(
        service.list_rows(table.id).await.unwrap(),
        vec![record(
            1,
            &[
                ("x", FieldValue::Integer(5)),
                ("y", FieldValue::Boolean(true)),
                ("z", FieldValue::Null),
            ]
        )]
    );

    assert!(matches!(
        service
            .update_table(table.id, schema(&[("x", FieldType::Boolean), ("y", FieldType::String)]))
            .await,
        Ok(_)
    ));
}
