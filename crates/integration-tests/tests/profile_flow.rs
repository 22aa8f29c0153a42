//! End-to-end profile flows: edit, validate, persist.

use marigold_integration_tests::{cleanup, open_storefront};
use marigold_storefront::models::ProfileInput;
use marigold_storefront::state::Storefront;
use marigold_storefront::stores::ProfileError;

fn input(name: &str, email: &str, phone: &str, address: &str) -> ProfileInput {
    ProfileInput {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
    }
}

#[tokio::test]
async fn test_profile_persists_across_reopen() {
    let (storefront, config) = open_storefront();

    storefront
        .profile()
        .update(&input(
            "Fern Callow",
            "fern@example.com",
            "+1 555 010 2345",
            "12 Garden Row",
        ))
        .expect("valid profile");
    drop(storefront);

    let reopened = Storefront::open(config.clone()).expect("reopen");
    let profile = reopened.profile().profile();
    assert_eq!(profile.name, "Fern Callow");
    assert_eq!(
        profile.email.as_ref().expect("email saved").as_str(),
        "fern@example.com"
    );
    assert!(profile.is_saved());

    cleanup(&config);
}

#[tokio::test]
async fn test_rejected_edit_keeps_the_stored_profile() {
    let (storefront, config) = open_storefront();
    let profiles = storefront.profile();

    profiles
        .update(&input("Fern", "fern@example.com", "", ""))
        .expect("valid profile");
    let before = profiles.profile();

    let err = profiles
        .update(&input("Fern", "fern@", "", ""))
        .expect_err("invalid email");
    assert!(matches!(err, ProfileError::InvalidEmail(_)));
    assert_eq!(err.to_string(), "Enter a valid email address");
    assert_eq!(profiles.profile(), before);

    let err = profiles
        .update(&input("", "", "", ""))
        .expect_err("missing name");
    assert_eq!(err, ProfileError::NameRequired);
    assert_eq!(profiles.profile(), before);

    cleanup(&config);
}

#[tokio::test]
async fn test_subscribers_see_profile_updates() {
    let (storefront, config) = open_storefront();
    let mut rx = storefront.profile().subscribe();

    storefront
        .profile()
        .update(&input("Fern", "", "", ""))
        .expect("valid profile");

    rx.changed().await.expect("update published");
    assert_eq!(rx.borrow_and_update().name, "Fern");

    cleanup(&config);
}

#[tokio::test]
async fn test_clearing_optional_fields() {
    let (storefront, config) = open_storefront();
    let profiles = storefront.profile();

    profiles
        .update(&input("Fern", "fern@example.com", "555-0102", "12 Garden Row"))
        .expect("valid profile");
    let cleared = profiles
        .update(&input("Fern", "", "", ""))
        .expect("clearing optionals is valid");

    assert_eq!(cleared.email, None);
    assert_eq!(cleared.phone, None);
    assert_eq!(cleared.address, None);

    cleanup(&config);
}
