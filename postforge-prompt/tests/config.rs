use serde_json::json;

use postforge_core::ValidationError;
use postforge_prompt::{
    is_valid_email, AudienceStage, GenerationConfig, PostType, PriceRange, Tone,
};

fn base_request() -> serde_json::Value {
    json!({
        "service": "Landing page design",
        "problem": "Low conversion",
        "result": "More demos booked",
        "audience": "B2B SaaS founders",
        "email": "a@b.com"
    })
}

#[test]
fn minimal_request_gets_documented_defaults() {
    let config = GenerationConfig::from_value(&base_request()).expect("valid");

    assert_eq!(config.service(), "Landing page design");
    assert_eq!(config.contact_email(), "a@b.com");
    assert_eq!(config.price_range(), PriceRange::Unsure);
    assert_eq!(config.audience_stage(), AudienceStage::Growing);
    assert_eq!(config.post_type(), PostType::Authority);
    assert_eq!(config.tone(), Tone::Direct);
    assert_eq!(config.topic(), None);
}

#[test]
fn text_fields_are_trimmed() {
    let mut request = base_request();
    request["service"] = json!("  Landing page design \n");
    request["topic"] = json!("   ");

    let config = GenerationConfig::from_value(&request).expect("valid");
    assert_eq!(config.service(), "Landing page design");
    assert_eq!(config.topic(), None);
}

#[test]
fn each_missing_required_field_is_rejected() {
    for field in ["service", "problem", "result", "audience", "email"] {
        let mut request = base_request();
        request.as_object_mut().unwrap().remove(field);

        let err = GenerationConfig::from_value(&request).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec![field]), "{field}");
    }
}

#[test]
fn whitespace_only_counts_as_missing() {
    let mut request = base_request();
    request["problem"] = json!("   ");
    request["audience"] = json!("\t");

    let err = GenerationConfig::from_value(&request).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingFields(vec!["problem", "audience"])
    );
}

#[test]
fn non_string_values_are_treated_as_absent() {
    let mut request = base_request();
    request["result"] = json!(42);
    request["tone"] = json!(["calm"]);

    let err = GenerationConfig::from_value(&request).unwrap_err();
    assert_eq!(err, ValidationError::MissingFields(vec!["result"]));
}

#[test]
fn malformed_email_is_rejected() {
    for email in ["not-an-email", "a@b", "a b@c.com", "@b.com"] {
        let mut request = base_request();
        request["email"] = json!(email);
        let err = GenerationConfig::from_value(&request).unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail, "{email}");
    }
}

#[test]
fn email_shape_check() {
    assert!(is_valid_email("founder@studio.io"));
    assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
    assert!(!is_valid_email("founder@studio"));
    assert!(!is_valid_email("founder studio@x.io"));
    assert!(!is_valid_email(""));
}

#[test]
fn unrecognized_enum_values_match_absent_values() {
    let absent = GenerationConfig::from_value(&base_request()).expect("valid");

    let mut request = base_request();
    request["priceRange"] = json!("a million");
    request["audienceStage"] = json!("enterprise");
    request["postType"] = json!("viral");
    request["tone"] = json!("shouty");
    let unrecognized = GenerationConfig::from_value(&request).expect("valid");

    assert_eq!(absent, unrecognized);
}

#[test]
fn recognized_enum_values_are_case_insensitive() {
    let mut request = base_request();
    request["priceRange"] = json!("5K_PLUS");
    request["audienceStage"] = json!(" Scaling ");
    request["postType"] = json!("contrarian");
    request["tone"] = json!("Educational");

    let config = GenerationConfig::from_value(&request).expect("valid");
    assert_eq!(config.price_range(), PriceRange::Over5k);
    assert_eq!(config.audience_stage(), AudienceStage::Scaling);
    assert_eq!(config.post_type(), PostType::Contrarian);
    assert_eq!(config.tone(), Tone::Educational);
}

#[test]
fn wire_values_round_trip_through_lenient_parse() {
    for price in PriceRange::ALL {
        assert_eq!(PriceRange::parse_lenient(Some(price.as_str())), *price);
    }
    for stage in AudienceStage::ALL {
        assert_eq!(AudienceStage::parse_lenient(Some(stage.as_str())), *stage);
    }
    assert_eq!(PriceRange::Under500.label(), "Under $500");
    assert_eq!(AudienceStage::Scaling.label(), "Scaling");
}

#[test]
fn builder_matches_json_normalization() {
    let built = GenerationConfig::builder()
        .service("Landing page design")
        .problem("Low conversion")
        .result("More demos booked")
        .audience("B2B SaaS founders")
        .post_type("authority")
        .email("a@b.com")
        .build()
        .expect("valid");

    assert_eq!(built, GenerationConfig::from_value(&base_request()).unwrap());
}
