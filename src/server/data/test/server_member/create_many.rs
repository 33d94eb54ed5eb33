use super::*;

/// Tests creating many records where some are invalid.
///
/// Verifies that each param gets its own result in input order and that invalid
/// params don't prevent valid ones from being created.
///
/// Expected: Ok, InvalidRecord, Ok and two rows inserted
#[tokio::test]
async fn isolates_invalid_records() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let results = repo
        .create_many(vec![
            create_param("a@example.com"),
            create_param("not-an-email"),
            create_param("b@example.com"),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Fault::InvalidRecord(_))));
    assert!(results[2].is_ok());
    assert_eq!(entity::prelude::ServerMember::find().count(db).await?, 2);

    Ok(())
}
