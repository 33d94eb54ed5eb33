use super::*;

/// Tests creating a record through the store.
///
/// Verifies that the email is normalized, names are trimmed and roles are stored.
///
/// Expected: Ok with normalized fields and one role row per role
#[tokio::test]
async fn creates_normalized_record_with_roles() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let mut param = create_param(" Jane.Doe@Example.com ");
    param.first_name = " Jane ".to_string();

    let record = MemberStore::create(&repo, param).await?;

    assert_eq!(record.email, "jane.doe@example.com");
    assert_eq!(record.first_name, "Jane");
    assert_eq!(record.roles, RoleSet::from([111111111, 222222222]));

    let role_count = entity::prelude::ServerMemberRole::find()
        .filter(entity::server_member_role::Column::ServerMemberId.eq(record.id))
        .count(db)
        .await?;
    assert_eq!(role_count, 2);

    Ok(())
}

/// Tests that a duplicate email is reported as a validation fault.
///
/// Expected: Err(Fault::InvalidRecord) mentioning the email
#[tokio::test]
async fn rejects_duplicate_email() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    MemberStore::create(&repo, create_param("jane@example.com")).await?;

    let result = MemberStore::create(&repo, create_param("JANE@example.com")).await;

    assert_eq!(
        result,
        Err(Fault::InvalidRecord("email must be unique".to_string()))
    );

    Ok(())
}

/// Tests that empty names are rejected before anything is written.
///
/// Expected: Err(Fault::InvalidRecord) and no rows inserted
#[tokio::test]
async fn rejects_empty_names() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let mut param = create_param("jane@example.com");
    param.last_name = "   ".to_string();

    let result = MemberStore::create(&repo, param).await;

    assert!(matches!(result, Err(Fault::InvalidRecord(_))));
    assert_eq!(entity::prelude::ServerMember::find().count(db).await?, 0);

    Ok(())
}
