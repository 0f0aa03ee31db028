use super::common::*;
use crate::domain::{SocietyUpdate, UserRole};
use crate::tenancy::{ContextError, IdentityState, TenantContext};

#[test]
fn refresh_waits_for_pending_identity() {
    let mut context = TenantContext::new();
    let directory = StaticDirectory::two_societies();

    context
        .refresh(&FixedIdentity(IdentityState::Pending), &directory)
        .expect("pending tolerated");
    assert!(context.is_loading());
    assert!(matches!(
        context.require_society(),
        Err(ContextError::NotReady)
    ));

    context
        .refresh(&FixedIdentity(IdentityState::SignedIn(admin())), &directory)
        .expect("signed in");
    assert!(!context.is_loading());
    assert_eq!(
        context.current_society().map(|society| society.id.clone()),
        Some(green_valley())
    );
    assert_eq!(context.current_user().map(|user| user.role), Some(UserRole::Admin));
}

#[test]
fn missing_membership_defaults_to_resident_on_first_society() {
    let mut context = TenantContext::new();
    let directory = StaticDirectory {
        membership: None,
        ..StaticDirectory::two_societies()
    };
    let mut principal = admin();
    principal.display_name = None;

    context.sign_in(principal, &directory).expect("signed in");

    let user = context.current_user().expect("user");
    assert_eq!(user.role, UserRole::Resident);
    assert_eq!(user.name, "User");
    assert_eq!(
        context.current_society().map(|society| society.id.clone()),
        Some(green_valley())
    );
}

#[test]
fn membership_outside_society_list_is_rejected() {
    let mut context = TenantContext::new();
    let mut directory = StaticDirectory::two_societies();
    directory.societies.truncate(0);

    let err = context
        .sign_in(admin(), &directory)
        .expect_err("home society missing");
    assert!(matches!(err, ContextError::SocietyNotFound(_)));
    assert!(context.is_loading());
}

#[test]
fn switch_is_idempotent_and_rejects_unknown_ids() {
    let mut context = signed_in_context();

    context.switch_society(&sunset()).expect("switch");
    context.switch_society(&sunset()).expect("switch again");
    assert_eq!(
        context.current_society().map(|society| society.name.as_str()),
        Some("Sunset Residency")
    );

    let err = context
        .switch_society(&crate::domain::SocietyId::new("society-missing"))
        .expect_err("unknown society");
    assert!(matches!(err, ContextError::SocietyNotFound(_)));
    assert_eq!(
        context.current_society().map(|society| society.id.clone()),
        Some(sunset())
    );
}

#[test]
fn update_society_changes_the_listed_copy() {
    let mut context = signed_in_context();

    context
        .update_society(SocietyUpdate {
            secondary_color: Some("#F59E0B".to_string()),
            ..SocietyUpdate::default()
        })
        .expect("update");

    let listed = context
        .societies()
        .iter()
        .find(|society| society.id == green_valley())
        .expect("listed");
    assert_eq!(listed.secondary_color, "#F59E0B");
    assert_eq!(
        context.current_society().map(|society| society.secondary_color.as_str()),
        Some("#F59E0B")
    );
}

#[test]
fn sign_out_clears_the_session() {
    let mut context = signed_in_context();
    context
        .refresh(
            &FixedIdentity(IdentityState::SignedOut),
            &StaticDirectory::two_societies(),
        )
        .expect("signed out");

    assert!(context.is_signed_out());
    assert!(context.societies().is_empty());
    assert!(context.current_user().is_none());
    assert!(matches!(
        context.update_society(SocietyUpdate::default()),
        Err(ContextError::NotReady)
    ));
}
