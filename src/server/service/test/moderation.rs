use super::*;

/// Tests kicking a linked member by email.
///
/// Expected: Ok and one kick issued for the linked account
#[tokio::test]
async fn kicks_linked_member_by_email() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .discord_id(555)
        .build()
        .await?;

    let gateway = gateway(&scope).with_member(platform_member(555, &[]));
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    service.kick("jane@example.com", None).await?;

    assert_eq!(gateway.calls(), vec![GatewayCall::Kick(555)]);

    Ok(())
}

/// Tests kicking a member the bot isn't allowed to kick.
///
/// Expected: Err(MemberNotKickable) without a kick call
#[tokio::test]
async fn rejects_unkickable_member() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let mut member = platform_member(555, &[]);
    member.kickable = false;
    let gateway = gateway(&scope).with_member(member);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    assert_eq!(
        service.kick("555", None).await,
        Err(Fault::MemberNotKickable(555))
    );
    assert!(gateway.calls().is_empty());

    Ok(())
}

/// Tests banning a bare platform id with no record.
///
/// Expected: Ok(555) and a ban carrying the reason
#[tokio::test]
async fn bans_bare_discord_id() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let gateway = gateway(&scope).with_member(platform_member(555, &[]));
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let banned = service
        .ban_or_unban("555", BanAction::Ban, Some("spam"))
        .await?;

    assert_eq!(banned, 555);
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::Ban(555, Some("spam".to_string()))]
    );

    Ok(())
}

/// Tests banning by the email of an unlinked record.
///
/// Expected: Err(RecordNotFound)
#[tokio::test]
async fn ban_by_unlinked_email_is_not_found() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .build()
        .await?;

    let gateway = gateway(&scope);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    assert_eq!(
        service
            .ban_or_unban("jane@example.com", BanAction::Ban, None)
            .await,
        Err(Fault::RecordNotFound)
    );

    Ok(())
}

/// Tests unbanning accounts with and without a ban.
///
/// Expected: Err(BanNotFound) for the unbanned account, one unban for the banned one
#[tokio::test]
async fn unban_checks_ban_list() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let gateway = gateway(&scope).with_ban(PlatformBan {
        discord_id: 555,
        username: "jane".to_string(),
        reason: None,
    });
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    assert_eq!(
        service.ban_or_unban("777", BanAction::Unban, None).await,
        Err(Fault::BanNotFound(777))
    );
    assert_eq!(
        service.ban_or_unban("555", BanAction::Unban, None).await,
        Ok(555)
    );
    assert_eq!(gateway.calls(), vec![GatewayCall::Unban(555)]);

    Ok(())
}

/// Tests that kick-many resets a student to the baseline roles before kicking.
///
/// Expected: record reset to student and prebootcamp, role write before the kick
#[tokio::test]
async fn kick_many_resets_roles_before_kick() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let student = role(&scope, "student");
    let prebootcamp = role(&scope, "stack-prebootcamp");
    let stack = role(&scope, "stack-backend");
    let cohort = role(&scope, "cohort-42");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .first_name("Jane")
        .last_name("Doe")
        .discord_id(555)
        .roles(&[student, stack, cohort])
        .build()
        .await?;

    let mut member = platform_member(555, &[student, stack, cohort]);
    member.nickname = Some("Jane_Doe".to_string());
    let gateway = gateway(&scope).with_member(member);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service
        .kick_many(&["jane@example.com".to_string()])
        .await?;

    let baseline = RoleSet::from([student, prebootcamp]);
    assert_eq!(bulk.results[0].as_ref().unwrap().roles, baseline);
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::SetRoles(555, baseline), GatewayCall::Kick(555)]
    );

    Ok(())
}

/// Tests that the reset is kept when the kick itself fails.
///
/// Expected: per-item Err(KickFailed) with the record already reset
#[tokio::test]
async fn kick_many_keeps_reset_when_kick_fails() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let employee = role(&scope, "employee");
    let staff = role(&scope, "staff");
    let instructor = role(&scope, "instructor");
    ServerMemberFactory::new(db)
        .email("sam@example.com")
        .discord_id(555)
        .roles(&[employee, staff, instructor])
        .build()
        .await?;

    let gateway = gateway(&scope)
        .with_member(platform_member(555, &[employee, staff, instructor]))
        .with_failing_kick(555);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service.kick_many(&["sam@example.com".to_string()]).await?;

    assert!(matches!(bulk.results[0], Err(Fault::KickFailed { .. })));
    assert_eq!(
        service.find_one("sam@example.com").await?.roles,
        RoleSet::from([instructor])
    );
    assert_eq!(bulk.stats.failed, 1);

    Ok(())
}

/// Tests kick-many on a linked alumni record.
///
/// Expected: roles left as they are, no student roles pushed, member kicked
#[tokio::test]
async fn kick_many_does_not_reset_alumni() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let alumni = role(&scope, "alumni");
    ServerMemberFactory::new(db)
        .email("alex@example.com")
        .discord_id(556)
        .roles(&[alumni])
        .build()
        .await?;

    let gateway = gateway(&scope).with_member(platform_member(556, &[alumni]));
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service.kick_many(&["alex@example.com".to_string()]).await?;

    assert_eq!(bulk.results[0].as_ref().unwrap().roles, RoleSet::from([alumni]));
    assert!(!gateway
        .calls()
        .iter()
        .any(|call| matches!(call, GatewayCall::SetRoles(..))));
    assert_eq!(gateway.calls().last(), Some(&GatewayCall::Kick(556)));

    Ok(())
}

/// Tests kick-many on an unlinked record and on a linked account that already left.
///
/// Expected: both reset to the baseline and reported Ok without any kick
#[tokio::test]
async fn kick_many_resets_unlinked_and_departed_records() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let student = role(&scope, "student");
    let prebootcamp = role(&scope, "stack-prebootcamp");
    let cohort = role(&scope, "cohort-42");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .roles(&[student, cohort])
        .build()
        .await?;
    ServerMemberFactory::new(db)
        .email("john@example.com")
        .discord_id(777)
        .roles(&[student, cohort])
        .build()
        .await?;

    let gateway = gateway(&scope);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service
        .kick_many(&["jane@example.com".to_string(), "john@example.com".to_string()])
        .await?;

    let baseline = RoleSet::from([student, prebootcamp]);
    assert_eq!(bulk.stats.ok, 2);
    assert_eq!(service.find_one("jane@example.com").await?.roles, baseline);
    assert_eq!(service.find_one("john@example.com").await?.roles, baseline);
    assert!(gateway.calls().is_empty());

    Ok(())
}

/// Tests kick-many on a banned account whose reset can't be pushed.
///
/// Expected: reset persisted, the failed push doesn't fail the item
#[tokio::test]
async fn kick_many_tolerates_failed_push() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let student = role(&scope, "student");
    let prebootcamp = role(&scope, "stack-prebootcamp");
    let stack = role(&scope, "stack-backend");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .discord_id(555)
        .roles(&[student, stack])
        .build()
        .await?;

    let gateway = gateway(&scope).with_ban(PlatformBan {
        discord_id: 555,
        username: "jane".to_string(),
        reason: None,
    });
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service.kick_many(&["jane@example.com".to_string()]).await?;

    assert_eq!(
        bulk.results[0].as_ref().unwrap().roles,
        RoleSet::from([student, prebootcamp])
    );
    assert!(gateway.calls().is_empty());

    Ok(())
}
