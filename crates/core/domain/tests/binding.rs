use domain::{Binding, GatewayType};

#[test]
fn binding_from_parts_builds_tagged_variants() {
    assert_eq!(
        Binding::from_parts("ELDER", Some("elder-1")),
        Binding::Elder("elder-1".to_string())
    );
    assert_eq!(
        Binding::from_parts("map_user", Some("user-1")),
        Binding::MapUser("user-1".to_string())
    );
    assert_eq!(
        Binding::from_parts("LINE_USER", Some("U123")),
        Binding::LineUser("U123".to_string())
    );
}

#[test]
fn binding_without_owner_is_unbound() {
    assert_eq!(Binding::from_parts("ELDER", None), Binding::Unbound);
    assert_eq!(Binding::from_parts("ELDER", Some("  ")), Binding::Unbound);
    assert_eq!(Binding::from_parts("UNBOUND", Some("elder-1")), Binding::Unbound);
    assert_eq!(Binding::from_parts("SOMETHING_ELSE", Some("x")), Binding::Unbound);
}

#[test]
fn unbound_has_no_subject_or_owner() {
    let binding = Binding::Unbound;
    assert!(binding.bound_to().is_none());
    assert!(binding.subject().is_none());
    assert_eq!(binding.binding_type(), "UNBOUND");
}

#[test]
fn subject_keys_are_namespaced_by_kind() {
    let elder = Binding::Elder("abc".to_string()).subject().expect("subject");
    let user = Binding::MapUser("abc".to_string()).subject().expect("subject");
    assert_eq!(elder.as_str(), "elder:abc");
    assert_eq!(user.as_str(), "map_user:abc");
    assert_ne!(elder, user);
}

#[test]
fn gateway_type_parse_is_case_insensitive() {
    assert_eq!(" safe_zone ".parse::<GatewayType>(), Ok(GatewayType::SafeZone));
    let err = "ROOFTOP".parse::<GatewayType>().expect_err("unknown");
    assert_eq!(err.to_string(), "unknown gateway type: ROOFTOP");
}
