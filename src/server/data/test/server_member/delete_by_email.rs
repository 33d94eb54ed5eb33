use super::*;

/// Tests deleting a record with its roles.
///
/// Expected: Ok(true) and no member or role rows left
#[tokio::test]
async fn deletes_record_and_roles() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::server_member::ServerMemberFactory::new(db)
        .email("jane@example.com")
        .roles(&[111111111])
        .build()
        .await?;

    let repo = ServerMemberRepository::new(db);
    let deleted = repo.delete_by_email("jane@example.com").await?;

    assert!(deleted);
    assert_eq!(entity::prelude::ServerMember::find().count(db).await?, 0);
    assert_eq!(entity::prelude::ServerMemberRole::find().count(db).await?, 0);

    Ok(())
}

/// Tests deleting an email with no record.
///
/// Expected: Ok(false)
#[tokio::test]
async fn returns_false_for_unknown_email() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let deleted = repo.delete_by_email("missing@example.com").await?;

    assert!(!deleted);

    Ok(())
}
