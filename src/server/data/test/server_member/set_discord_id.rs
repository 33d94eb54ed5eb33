use super::*;

/// Tests linking and then unlinking a record.
///
/// Expected: discord id set after linking and cleared after unlinking
#[tokio::test]
async fn links_and_unlinks() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_server_member(db).await?;

    let repo = ServerMemberRepository::new(db);
    let linked = repo.set_discord_id(member.id, Some(123456789)).await?.unwrap();
    assert_eq!(linked.discord_id, Some(123456789));

    let unlinked = repo.set_discord_id(member.id, None).await?.unwrap();
    assert!(unlinked.discord_id.is_none());

    Ok(())
}

/// Tests that an account can't be linked to two records.
///
/// Expected: Err(Fault::InvalidRecord) naming the discord id
#[tokio::test]
async fn store_rejects_account_linked_elsewhere() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_linked_server_member(db, 123456789, &[]).await?;
    let other = factory::create_server_member(db).await?;

    let repo = ServerMemberRepository::new(db);
    let result = MemberStore::set_discord_id(&repo, other.id, Some(123456789)).await;

    assert_eq!(
        result,
        Err(Fault::InvalidRecord("discord_id must be unique".to_string()))
    );

    Ok(())
}
