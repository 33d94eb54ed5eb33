use super::*;

/// Tests replacing a record's roles.
///
/// Expected: Ok(Some) with only the new roles stored
#[tokio::test]
async fn replaces_roles() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::server_member::ServerMemberFactory::new(db)
        .roles(&[111111111, 222222222])
        .build()
        .await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo
        .update_by_id(
            member.id,
            UpdateServerMemberParam {
                roles: Some(RoleSet::from([333333333])),
                ..Default::default()
            },
        )
        .await?
        .unwrap();

    assert_eq!(record.roles, RoleSet::from([333333333]));

    let role_count = entity::prelude::ServerMemberRole::find()
        .filter(entity::server_member_role::Column::ServerMemberId.eq(member.id))
        .count(db)
        .await?;
    assert_eq!(role_count, 1);

    Ok(())
}

/// Tests updating profile fields without touching roles.
///
/// Expected: Ok(Some) with the new name and the original roles
#[tokio::test]
async fn updates_profile_fields_only() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::server_member::ServerMemberFactory::new(db)
        .first_name("Jane")
        .roles(&[111111111])
        .build()
        .await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo
        .update_by_id(
            member.id,
            UpdateServerMemberParam {
                first_name: Some("Janet".to_string()),
                ..Default::default()
            },
        )
        .await?
        .unwrap();

    assert_eq!(record.first_name, "Janet");
    assert_eq!(record.last_name, member.last_name);
    assert_eq!(record.roles, RoleSet::from([111111111]));

    Ok(())
}

/// Tests updating a record that doesn't exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_id() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ServerMemberRepository::new(db);
    let record = repo
        .update_by_id(999, UpdateServerMemberParam::default())
        .await?;

    assert!(record.is_none());

    Ok(())
}

/// Tests that the store rejects an empty first name on update.
///
/// Expected: Err(Fault::InvalidRecord)
#[tokio::test]
async fn store_rejects_empty_first_name() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_server_member(db).await?;

    let repo = ServerMemberRepository::new(db);
    let result = MemberStore::update_by_id(
        &repo,
        member.id,
        UpdateServerMemberParam {
            first_name: Some(" ".to_string()),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(Fault::InvalidRecord(_))));

    Ok(())
}
