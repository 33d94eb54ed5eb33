use super::*;

/// Tests finding a record by its email.
///
/// Verifies that the record is returned with every stored role.
///
/// Expected: Ok(Some) with matching email and roles
#[tokio::test]
async fn finds_record_with_roles() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::server_member::ServerMemberFactory::new(db)
        .email("jane@example.com")
        .roles(&[111111111, 222222222])
        .build()
        .await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo.find_by_email("jane@example.com").await?.unwrap();

    assert_eq!(record.id, member.id);
    assert_eq!(record.roles, RoleSet::from([111111111, 222222222]));
    assert!(record.discord_id.is_none());

    Ok(())
}

/// Tests that the store normalizes the email before searching.
///
/// Expected: Ok(Some) for a padded, uppercased email
#[tokio::test]
async fn store_normalizes_email_before_lookup() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::server_member::ServerMemberFactory::new(db)
        .email("jane@example.com")
        .build()
        .await?;

    let repo = ServerMemberRepository::new(db);
    let record = MemberStore::find_by_email(&repo, "  JANE@Example.com ").await?;

    assert!(record.is_some());

    Ok(())
}

/// Tests finding an email with no record.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_email() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let record = repo.find_by_email("missing@example.com").await?;

    assert!(record.is_none());

    Ok(())
}
