use super::*;
use crate::server::{
    gateway::fake::FIRST_CREATED_ID,
    model::platform::NewRole,
    service::role::{RoleService, COHORT_ROLE_COLOUR},
};

/// Tests creating a cohort role from a typed name.
///
/// Expected: Mentionable `cohort-` role with the cohort colour
#[tokio::test]
async fn creates_cohort_role() -> Result<(), Fault> {
    let scope = scope();
    let gateway = gateway(&scope);
    let service = RoleService::new(&gateway, &scope);

    let created = service.create_cohort_role("Neil M").await?;

    assert_eq!(created.id, FIRST_CREATED_ID);
    assert_eq!(created.name, "cohort-neil-m");
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::CreateRole(NewRole {
            name: "cohort-neil-m".to_string(),
            colour: COHORT_ROLE_COLOUR,
            mentionable: true,
            reason: Some("Setting up a new cohort for specified instructor.".to_string()),
        })]
    );

    Ok(())
}

/// Tests creating a cohort role that already exists or has a blank name.
///
/// Expected: Err(InvalidRoleSelection), nothing created
#[tokio::test]
async fn rejects_existing_or_blank_cohort_role() {
    let scope = scope();
    let gateway = gateway(&scope);
    let service = RoleService::new(&gateway, &scope);

    assert!(matches!(
        service.create_cohort_role("Cohort 42").await,
        Err(Fault::InvalidRoleSelection(_))
    ));
    assert!(matches!(
        service.create_cohort_role("cohort-").await,
        Err(Fault::InvalidRoleSelection(_))
    ));
    assert!(gateway.calls().is_empty());
}

/// Tests deleting a mix of deletable and protected roles.
///
/// Verifies a key role, a managed role, `@everyone`, an unknown role and a role the
/// platform refuses each fail on their own while the cohort role is deleted.
///
/// Expected: 1 ok / 5 failed, only the cohort role deleted
#[tokio::test]
async fn deletes_many_roles_isolating_failures() -> Result<(), Fault> {
    let scope = scope();
    let cohort = role(&scope, "cohort-41");
    let announcements = role(&scope, "announcements");
    let gateway = gateway(&scope).with_failing_target(announcements);
    let service = RoleService::new(&gateway, &scope);

    let results = service
        .delete_many(&[
            cohort,
            scope.taxonomy.key.student,
            999,
            scope.id(),
            12345,
            announcements,
        ])
        .await?;

    assert_eq!(results.stats.ok, 1);
    assert_eq!(results.stats.failed, 5);
    assert_eq!(results.results[0].as_ref().map(|role| role.id), Ok(cohort));
    for result in &results.results[1..5] {
        assert!(matches!(result, Err(Fault::InvalidRoleSelection(_))));
    }
    assert!(matches!(
        results.results[5],
        Err(Fault::RoleDeleteFailed { .. })
    ));
    assert_eq!(gateway.calls(), vec![GatewayCall::DeleteRole(cohort)]);

    Ok(())
}

/// Tests deleting with no roles or more roles than the bulk limit.
///
/// Expected: The whole request refused
#[tokio::test]
async fn rejects_empty_or_oversized_role_deletion() {
    let scope = scope();
    let gateway = gateway(&scope);
    let service = RoleService::new(&gateway, &scope);

    let too_many: Vec<u64> = (0..=BULK_REQUEST_LIMIT as u64).collect();

    assert!(matches!(
        service.delete_many(&[]).await,
        Err(Fault::InvalidRoleSelection(_))
    ));
    assert_eq!(
        service.delete_many(&too_many).await,
        Err(Fault::BulkRequestLimit)
    );
    assert!(gateway.calls().is_empty());
}
