//! Tests for the marketplace user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn business_input() -> RoleProfileInput {
    RoleProfileInput {
        business_name: Some("Green Works".into()),
        raw_materials: Some("plastic, Metal , ,paper".into()),
        gst_number: Some("  ".into()),
        rep_name: Some("Ravi".into()),
        ..RoleProfileInput::default()
    }
}

#[rstest]
#[case("", UserValidationError::MissingField { field: "username" })]
#[case("   ", UserValidationError::MissingField { field: "username" })]
#[case("two words", UserValidationError::UsernameInvalidCharacters)]
fn invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn long_username_rejected() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
#[case("customer", UserType::Customer)]
#[case("Scrap_Collector", UserType::ScrapCollector)]
#[case("scrap-collector", UserType::ScrapCollector)]
#[case(" business ", UserType::Business)]
fn user_type_parses(#[case] raw: &str, #[case] expected: UserType) {
    assert_eq!(raw.parse::<UserType>(), Ok(expected));
}

#[rstest]
fn unknown_user_type_reports_type_field() {
    let err = "admin".parse::<UserType>().expect_err("unknown role");
    assert_eq!(err.field(), "type");
}

#[rstest]
#[case(UserType::Customer, false)]
#[case(UserType::ScrapCollector, true)]
#[case(UserType::Business, true)]
fn claim_policy_per_role(#[case] user_type: UserType, #[case] expected: bool) {
    assert_eq!(user_type.can_claim(), expected);
}

#[rstest]
#[case("1234 5678 9012", true)]
#[case("123456789012", true)]
#[case("12345678901", false)]
#[case("12345678901a", false)]
fn aadhaar_validation(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(Aadhaar::new(raw).is_ok(), ok);
}

#[rstest]
fn raw_materials_are_trimmed_and_deduplicated() {
    assert_eq!(
        parse_raw_materials("Plastic,plastic, glass,,"),
        vec!["Plastic".to_owned(), "glass".to_owned()]
    );
}

#[rstest]
fn business_profile_keeps_only_filled_optional_fields(business_input: RoleProfileInput) {
    let profile = RoleProfile::try_from_input(UserType::Business, &business_input)
        .expect("business profile");
    assert_eq!(profile.user_type(), UserType::Business);
    assert_eq!(profile.raw_materials(), ["plastic", "Metal", "paper"]);
    let RoleProfile::Business {
        gst_number,
        rep_name,
        ..
    } = profile
    else {
        panic!("expected business profile");
    };
    assert_eq!(gst_number, None);
    assert_eq!(rep_name.as_deref(), Some("Ravi"));
}

#[rstest]
fn business_profile_requires_raw_materials(mut business_input: RoleProfileInput) {
    business_input.raw_materials = Some(" , ".into());
    let err = RoleProfile::try_from_input(UserType::Business, &business_input)
        .expect_err("materials required");
    assert_eq!(err.field(), "rawMaterials");
}

#[rstest]
fn scrap_collector_profile_names_missing_field() {
    let input = RoleProfileInput {
        full_name: Some("Kiran".into()),
        address: Some("12 Lane".into()),
        city: Some("Pune".into()),
        pincode: Some("411001".into()),
        vehicle: Some("truck".into()),
        ..RoleProfileInput::default()
    };
    let err = RoleProfile::try_from_input(UserType::ScrapCollector, &input)
        .expect_err("scrap type missing");
    assert_eq!(err, UserValidationError::MissingField { field: "scrapType" });
}

#[rstest]
fn customer_profile_rejects_bad_aadhaar() {
    let input = RoleProfileInput {
        address: Some("1 Main St".into()),
        aadhaar: Some("42".into()),
        ..RoleProfileInput::default()
    };
    let err = RoleProfile::try_from_input(UserType::Customer, &input).expect_err("bad aadhaar");
    assert_eq!(err.field(), "aadhaar");
}

#[rstest]
#[case(None, Ok(None))]
#[case(Some("  "), Ok(None))]
#[case(Some("a@b.io"), Ok(Some("a@b.io".to_owned())))]
#[case(Some("nope"), Err(UserValidationError::InvalidEmail))]
fn email_parsing(
    #[case] raw: Option<&str>,
    #[case] expected: Result<Option<String>, UserValidationError>,
) {
    assert_eq!(parse_email(raw), expected);
}

#[rstest]
fn user_requires_phone(created_at: DateTime<Utc>) {
    let profile = RoleProfile::Customer {
        address: "1 Main St".into(),
        aadhaar: None,
    };
    let err = User::try_new(
        Username::new("alice").expect("username"),
        " ",
        None,
        profile,
        created_at,
    )
    .expect_err("phone required");
    assert_eq!(err.field(), "phone");
}

#[rstest]
fn user_serialises_flat_profile(created_at: DateTime<Utc>, business_input: RoleProfileInput) {
    let profile =
        RoleProfile::try_from_input(UserType::Business, &business_input).expect("profile");
    let user = User::try_new(
        Username::new("greenworks").expect("username"),
        "9876543210",
        Some("ops@green.works"),
        profile,
        created_at,
    )
    .expect("user");

    let value = serde_json::to_value(&user).expect("serialise");
    assert_eq!(value["username"], json!("greenworks"));
    assert_eq!(value["type"], json!("business"));
    assert_eq!(value["businessName"], json!("Green Works"));
    assert_eq!(value["rawMaterials"], json!(["plastic", "Metal", "paper"]));
    assert_eq!(value["createdAt"], json!("2024-05-01T09:30:00Z"));

    let decoded: User = serde_json::from_value(value).expect("deserialise");
    assert_eq!(decoded, user);
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$argon2id$v=19$secret");
    assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
}
