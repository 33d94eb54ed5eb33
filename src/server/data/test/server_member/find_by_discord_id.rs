use super::*;

/// Tests finding the record linked to a Discord account.
///
/// Expected: Ok(Some) with the parsed discord id
#[tokio::test]
async fn finds_linked_record() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_linked_server_member(db, 123456789, &[111111111]).await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo.find_by_discord_id(123456789).await?.unwrap();

    assert_eq!(record.id, member.id);
    assert_eq!(record.discord_id, Some(123456789));

    Ok(())
}

/// Tests that unlinked records are not returned for a Discord id.
///
/// Expected: Ok(None)
#[tokio::test]
async fn ignores_unlinked_records() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_server_member(db).await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo.find_by_discord_id(123456789).await?;

    assert!(record.is_none());

    Ok(())
}

/// Tests that a stored discord id which isn't numeric fails conversion.
///
/// Expected: Err(DbErr::Custom)
#[tokio::test]
async fn fails_on_unparseable_discord_id() -> Result<(), DbErr> {
    use sea_orm::{ActiveModelTrait, ActiveValue};

    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::server_member::ServerMemberFactory::new(db)
        .email("jane@example.com")
        .build()
        .await?;
    let mut active: entity::server_member::ActiveModel = member.into();
    active.discord_id = ActiveValue::Set(Some("not-a-number".to_string()));
    active.update(db).await?;

    let repo = ServerMemberRepository::new(db);
    let result = repo.find_by_email("jane@example.com").await;

    assert!(matches!(result, Err(DbErr::Custom(_))));

    Ok(())
}
