use super::*;

/// Tests that the email match wins over the discord id match.
///
/// Expected: Ok(Some) with the record found by email
#[tokio::test]
async fn prefers_email_match() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let by_email = factory::server_member::ServerMemberFactory::new(db)
        .email("jane@example.com")
        .build()
        .await?;
    factory::create_linked_server_member(db, 123456789, &[]).await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo
        .find_by_email_or_discord_id("jane@example.com", 123456789)
        .await?
        .unwrap();

    assert_eq!(record.id, by_email.id);

    Ok(())
}

/// Tests falling back to the linked record when no email matches.
///
/// Expected: Ok(Some) with the record linked to the discord id
#[tokio::test]
async fn falls_back_to_discord_id() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let linked = factory::create_linked_server_member(db, 123456789, &[]).await?;

    let repo = ServerMemberRepository::new(db);
    let record = repo
        .find_by_email_or_discord_id("other@example.com", 123456789)
        .await?
        .unwrap();

    assert_eq!(record.id, linked.id);

    Ok(())
}
