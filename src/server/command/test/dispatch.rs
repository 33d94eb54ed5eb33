use super::*;

struct Tree {
    registry: CommandRegistry,
    s: Counting,
    t: Counting,
    direct: Counting,
}

/// Registry `{a: {g: {s, t}, direct}}` where `direct` only runs in a server.
fn tree() -> Tree {
    let s = Counting::default();
    let t = Counting::default();
    let direct = Counting::default();

    let group = SubcommandGroupBuilder::new()
        .name("g")
        .description("Group.")
        .subcommand(
            SubcommandBuilder::new()
                .name("s")
                .description("S.")
                .handler(SubcommandHandler::any_context(s.clone()))
                .build()
                .unwrap(),
        )
        .subcommand(
            SubcommandBuilder::new()
                .name("t")
                .description("T.")
                .handler(SubcommandHandler::any_context(t.clone()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let command = CommandBuilder::new()
        .name("a")
        .description("A.")
        .group(group)
        .subcommand(
            SubcommandBuilder::new()
                .name("direct")
                .description("Direct.")
                .handler(SubcommandHandler::in_guild(direct.clone()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    Tree {
        registry: CommandRegistry::new(vec![command]).unwrap(),
        s,
        t,
        direct,
    }
}

/// Tests that a full path reaches only its own handler.
///
/// Expected: Only `s` runs and dispatch sends nothing beyond the handler's reply
#[tokio::test]
async fn dispatches_to_exactly_one_handler() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", Some("g"), "s", None);

    let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

    assert_eq!(fault, None);
    assert_eq!(tree.s.count(), 1);
    assert_eq!(tree.t.count(), 0);
    assert_eq!(tree.direct.count(), 0);
    assert_eq!(responder.calls(), vec![ResponderCall::Reply("done".to_string())]);

    Ok(())
}

/// Tests paths that don't resolve.
///
/// Verifies a wrong subcommand, a wrong group and a wrong command each produce a
/// not-found fault with exactly one reply and no handler call.
///
/// Expected: SlashCommandNotFound replied once per path
#[tokio::test]
async fn unresolved_paths_reply_not_found_once() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let paths = [
        ("a", Some("g"), "wrong"),
        ("a", Some("wrong"), "s"),
        ("wrong", Some("g"), "s"),
        ("a", None, "s"),
    ];

    for (command, group, subcommand) in paths {
        let responder = RecordingResponder::new();
        let mut invocation = invocation(&responder, command, group, subcommand, None);

        let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

        assert!(
            matches!(fault, Some(Fault::SlashCommandNotFound(_))),
            "{:?} should not resolve",
            (command, group, subcommand)
        );
        let calls = responder.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], ResponderCall::Reply(content) if content.contains("was not found")));
    }

    assert_eq!(tree.s.count(), 0);
    assert_eq!(tree.t.count(), 0);

    Ok(())
}

/// Tests a server-only handler invoked from a direct message.
///
/// Expected: SlashCommandSetup without calling the handler
#[tokio::test]
async fn guild_handler_without_community_is_setup_fault() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "direct", None);

    let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

    assert!(matches!(fault, Some(Fault::SlashCommandSetup(_))));
    assert_eq!(tree.direct.count(), 0);
    assert_eq!(responder.calls().len(), 1);

    Ok(())
}

/// Tests a server-only handler invoked in a server.
///
/// Expected: Handler runs with the loaded community scope
#[tokio::test]
async fn guild_handler_receives_scope() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "direct", Some(1));

    let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

    assert_eq!(fault, None);
    assert_eq!(
        responder.calls(),
        vec![ResponderCall::Reply("done in 1".to_string())]
    );

    Ok(())
}

/// Tests a community with a renamed key role.
///
/// Verifies the taxonomy error is contained at dispatch and reported as a setup fault.
///
/// Expected: SlashCommandSetup listing the missing role, handler not called
#[tokio::test]
async fn missing_key_role_is_setup_fault() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let mut community = community_with_key_roles();
    community.roles.retain(|role| role.name != "alumni");
    let gateway = FakeGateway::new(community);
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "direct", Some(1));

    let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

    match fault {
        Some(Fault::SlashCommandSetup(message)) => assert!(message.contains("alumni")),
        other => panic!("expected setup fault, got {:?}", other),
    }
    assert_eq!(tree.direct.count(), 0);

    Ok(())
}

/// Tests a community the bot can't see.
///
/// Expected: CommunityNotCached
#[tokio::test]
async fn uncached_community_is_reported() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::uncached();
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let tree = tree();

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "direct", Some(1));

    let fault = tree.registry.dispatch(&ctx, &mut invocation).await;

    assert_eq!(fault, Some(Fault::CommunityNotCached(1)));

    Ok(())
}

/// Handler that panics before replying.
struct Panicking;

#[async_trait]
impl AnyHandler for Panicking {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        _invocation: &mut Invocation,
    ) -> Result<(), Fault> {
        let empty: Vec<u64> = Vec::new();
        let _ = empty[3];
        Ok(())
    }
}

/// Handler that defers then never finishes in time.
struct Stalling;

#[async_trait]
impl AnyHandler for Stalling {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
    ) -> Result<(), Fault> {
        invocation.defer(false).await?;
        tokio::time::sleep(Duration::from_secs(5)).await;
        invocation.edit_reply(ReplyMessage::public("late")).await
    }
}

fn single(handler: SubcommandHandler) -> CommandRegistry {
    let command = CommandBuilder::new()
        .name("a")
        .description("A.")
        .subcommand(
            SubcommandBuilder::new()
                .name("s")
                .description("S.")
                .handler(handler)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    CommandRegistry::new(vec![command]).unwrap()
}

/// Tests a handler that panics.
///
/// Expected: dispatch returns an unidentified fault and replies once
#[tokio::test]
async fn panicking_handler_is_contained() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let registry = single(SubcommandHandler::any_context(Panicking));

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "s", None);

    let fault = registry.dispatch(&ctx, &mut invocation).await;

    assert_eq!(
        fault,
        Some(Fault::Unidentified(UNIDENTIFIED_FAULT_MESSAGE.to_string()))
    );
    assert_eq!(
        responder.calls(),
        vec![ResponderCall::Reply(UNIDENTIFIED_FAULT_MESSAGE.to_string())]
    );

    Ok(())
}

/// Tests a handler running past the handler timeout after deferring.
///
/// Expected: InteractionTimeout reported by editing the deferred reply
#[tokio::test]
async fn stalled_handler_times_out() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let store = ServerMemberRepository::new(db);
    let gateway = FakeGateway::new(community_with_key_roles());
    let ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: 1,
    };
    let registry = single(SubcommandHandler::any_context(Stalling))
        .with_handler_timeout(Duration::from_millis(20));

    let responder = RecordingResponder::new();
    let mut invocation = invocation(&responder, "a", None, "s", None);

    let fault = registry.dispatch(&ctx, &mut invocation).await;

    assert_eq!(fault, Some(Fault::InteractionTimeout));
    assert_eq!(
        responder.calls(),
        vec![
            ResponderCall::Defer,
            ResponderCall::EditReply(Fault::InteractionTimeout.to_string()),
        ]
    );

    Ok(())
}
