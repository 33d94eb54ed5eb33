use super::*;

fn emails(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Tests a batch above the bulk ceiling.
///
/// Expected: Err(BulkRequestLimit) before any record or member is touched
#[tokio::test]
async fn rejects_batch_above_limit() -> Result<(), Fault> {
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

    let batch = vec!["jane@example.com".to_string(); BULK_REQUEST_LIMIT + 1];
    let selection = RoleSet::from([role(&scope, "alumni")]);

    let result = service
        .update_many_roles(&batch, RoleUpdateMethod::Add, &selection, true)
        .await;

    assert_eq!(result, Err(Fault::BulkRequestLimit));
    assert!(gateway.calls().is_empty());
    assert!(service.find_one("jane@example.com").await?.roles.is_empty());

    Ok(())
}

/// Tests that results keep input order and misses don't abort the batch.
///
/// Expected: Ok, RecordNotFound, Ok with stats 2 ok, 1 failed, 3 total
#[tokio::test]
async fn keeps_input_order_with_per_item_faults() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    ServerMemberFactory::new(db)
        .email("a@example.com")
        .build()
        .await?;
    ServerMemberFactory::new(db)
        .email("b@example.com")
        .build()
        .await?;

    let gateway = gateway(&scope);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let alumni = role(&scope, "alumni");
    let bulk = service
        .update_many_roles(
            &emails(&["a@example.com", "missing@example.com", "b@example.com"]),
            RoleUpdateMethod::Add,
            &RoleSet::from([alumni]),
            true,
        )
        .await?;

    assert_eq!(bulk.results.len(), 3);
    assert_eq!(bulk.results[0].as_ref().unwrap().email, "a@example.com");
    assert_eq!(bulk.results[1], Err(Fault::RecordNotFound));
    assert_eq!(bulk.results[2].as_ref().unwrap().email, "b@example.com");
    assert_eq!((bulk.stats.ok, bulk.stats.failed, bulk.stats.total), (2, 1, 3));
    assert!(service.find_one("b@example.com").await?.roles.contains(&alumni));

    Ok(())
}

/// Tests a change-cohort selection missing the stack role.
///
/// Expected: Err(InvalidRoleSelection) and the record unchanged
#[tokio::test]
async fn rejects_incomplete_change_cohort_selection() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let cohort_41 = role(&scope, "cohort-41");
    let cohort_42 = role(&scope, "cohort-42");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .roles(&[cohort_41])
        .build()
        .await?;

    let gateway = gateway(&scope);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let result = service
        .update_many_roles(
            &emails(&["jane@example.com"]),
            RoleUpdateMethod::ChangeCohort,
            &RoleSet::from([cohort_42]),
            true,
        )
        .await;

    assert!(matches!(result, Err(Fault::InvalidRoleSelection(_))));
    assert_eq!(
        service.find_one("jane@example.com").await?.roles,
        RoleSet::from([cohort_41])
    );

    Ok(())
}

/// Tests that a caller without elevated access can't grant admin roles.
///
/// Expected: the non-admin role is added and the admin role is dropped
#[tokio::test]
async fn filters_admin_roles_for_non_elevated_callers() -> Result<(), Fault> {
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

    let admin = role(&scope, "admin");
    let announcements = role(&scope, "announcements");
    let bulk = service
        .update_many_roles(
            &emails(&["jane@example.com"]),
            RoleUpdateMethod::Add,
            &RoleSet::from([admin, announcements]),
            false,
        )
        .await?;

    let record = bulk.results[0].as_ref().unwrap();
    assert!(record.roles.contains(&announcements));
    assert!(!record.roles.contains(&admin));

    Ok(())
}

/// Tests graduating a linked student.
///
/// Expected: record and member both end with only the alumni role
#[tokio::test]
async fn to_alumni_is_pushed_to_member() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let student = role(&scope, "student");
    let stack = role(&scope, "stack-backend");
    let cohort = role(&scope, "cohort-42");
    let alumni = role(&scope, "alumni");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .discord_id(555)
        .roles(&[student, stack, cohort])
        .build()
        .await?;

    let gateway = gateway(&scope).with_member(platform_member(555, &[student, stack, cohort]));
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service
        .update_many_roles(
            &emails(&["jane@example.com"]),
            RoleUpdateMethod::ToAlumni,
            &RoleSet::new(),
            true,
        )
        .await?;

    assert_eq!(bulk.results[0].as_ref().unwrap().roles, RoleSet::from([alumni]));
    assert_eq!(gateway.member(555).unwrap().roles, RoleSet::from([alumni]));

    Ok(())
}

/// Tests that a record can't end up with both the student and employee roles.
///
/// Expected: per-item Err(InvalidRoleSelection) and the record unchanged
#[tokio::test]
async fn rejects_student_employee_mix() -> Result<(), Fault> {
    let test = TestBuilder::new()
        .with_server_member_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    let scope = scope();

    let student = role(&scope, "student");
    let employee = role(&scope, "employee");
    ServerMemberFactory::new(db)
        .email("jane@example.com")
        .roles(&[student])
        .build()
        .await?;

    let gateway = gateway(&scope);
    let repo = ServerMemberRepository::new(db);
    let service = ServerMemberService::new(&repo, &gateway, &scope);

    let bulk = service
        .update_many_roles(
            &emails(&["jane@example.com"]),
            RoleUpdateMethod::Add,
            &RoleSet::from([employee]),
            true,
        )
        .await?;

    assert!(matches!(bulk.results[0], Err(Fault::InvalidRoleSelection(_))));
    assert_eq!(
        service.find_one("jane@example.com").await?.roles,
        RoleSet::from([student])
    );

    Ok(())
}
