/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use ari_platform_api::capture_models::FormData;
use ari_platform_api::scoring::{calculate_lead_score, unit_price_for, weekday_name};
use ari_platform_api::webhook_handler::generate_quote;
use ari_platform_api::webhook_models::StructuredData;
use proptest::prelude::*;
use serde_json::json;

/// Structured-data payloads with an arbitrary subset of scoring fields set.
fn structured_with(
    email: bool,
    phone: bool,
    budget: bool,
    timeline: bool,
    quality: Option<&str>,
) -> StructuredData {
    let mut value = serde_json::Map::new();
    if email {
        value.insert("email".into(), json!("a@b.c"));
    }
    if phone {
        value.insert("phone".into(), json!("+15550100"));
    }
    if budget {
        value.insert("budget".into(), json!("10k"));
    }
    if timeline {
        value.insert("timeline".into(), json!("soon"));
    }
    if let Some(q) = quality {
        value.insert("leadQuality".into(), json!(q));
    }
    serde_json::from_value(serde_json::Value::Object(value)).unwrap()
}

// Property: score always lands in [50, 100]
proptest! {
    #[test]
    fn score_stays_in_bounds(
        email in proptest::bool::ANY,
        phone in proptest::bool::ANY,
        budget in proptest::bool::ANY,
        timeline in proptest::bool::ANY,
        quality in prop::sample::select(vec![None, Some("hot"), Some("warm"), Some("cold")])
    ) {
        let score = calculate_lead_score(&structured_with(email, phone, budget, timeline, quality));
        prop_assert!((50..=100).contains(&score));
    }

    #[test]
    fn hot_adds_twenty_up_to_the_cap(
        email in proptest::bool::ANY,
        phone in proptest::bool::ANY,
        budget in proptest::bool::ANY,
        timeline in proptest::bool::ANY
    ) {
        let without = calculate_lead_score(&structured_with(email, phone, budget, timeline, None));
        let with_hot = calculate_lead_score(&structured_with(email, phone, budget, timeline, Some("hot")));
        prop_assert_eq!(with_hot, (without + 20).min(100));
    }

    #[test]
    fn warm_adds_ten_up_to_the_cap(
        email in proptest::bool::ANY,
        phone in proptest::bool::ANY,
        budget in proptest::bool::ANY,
        timeline in proptest::bool::ANY
    ) {
        let without = calculate_lead_score(&structured_with(email, phone, budget, timeline, None));
        let with_warm = calculate_lead_score(&structured_with(email, phone, budget, timeline, Some("warm")));
        prop_assert_eq!(with_warm, (without + 10).min(100));
    }

    // Scoring should never panic, whatever shape the fields arrive in.
    #[test]
    fn score_never_panics_on_arbitrary_field_types(
        email in prop::sample::select(vec![json!(null), json!(""), json!("x"), json!(0), json!(42), json!(true), json!([1]), json!({"a": 1})]),
        budget in prop::sample::select(vec![json!(null), json!(""), json!("10k"), json!(0), json!(9.5)])
    ) {
        let data: StructuredData =
            serde_json::from_value(json!({"email": email, "budget": budget})).unwrap();
        let score = calculate_lead_score(&data);
        prop_assert!((0..=100).contains(&score));
    }
}

// Property: quote arithmetic holds for every tier
proptest! {
    #[test]
    fn quote_total_is_rate_times_quantity(
        service in prop::sample::select(vec!["standard", "premium", "enterprise", "other"]),
        quantity in 1i64..=100
    ) {
        let result = generate_quote(&json!({"service": service, "quantity": quantity}));
        let rate = unit_price_for(Some(service));
        prop_assert_eq!(result["quote"]["unitPrice"].as_i64().unwrap(), rate);
        prop_assert_eq!(result["quote"]["total"].as_i64().unwrap(), rate * quantity);
    }

    #[test]
    fn quote_message_contains_total(
        service in prop::sample::select(vec!["standard", "premium", "enterprise"]),
        quantity in 1i64..=50
    ) {
        let result = generate_quote(&json!({"service": service, "quantity": quantity}));
        let total = result["quote"]["total"].as_i64().unwrap();
        prop_assert!(result["message"].as_str().unwrap().contains(&total.to_string()));
    }
}

// Property: form resolution never panics and numeric keys always win
proptest! {
    #[test]
    fn form_resolution_never_panics(keys in prop::collection::hash_map("[a-z0-9]{1,6}", "\\PC{0,20}", 0..8)) {
        let map: serde_json::Map<String, serde_json::Value> = keys
            .into_iter()
            .map(|(k, v)| (k, json!(v)))
            .collect();
        let data = FormData(serde_json::Value::Object(map));
        let _ = data.name();
        let _ = data.email();
        let _ = data.phone();
        let _ = data.company();
    }

    #[test]
    fn numeric_key_always_wins(numeric in "[A-Za-z]{1,12}", named in "[A-Za-z]{1,12}") {
        let data = FormData(json!({"1": numeric.clone(), "name": named}));
        prop_assert_eq!(data.name(), numeric);
    }
}

// Property: weekday parsing never panics
proptest! {
    #[test]
    fn weekday_name_never_panics(input in "\\PC*") {
        let _ = weekday_name(&input);
    }

    #[test]
    fn weekday_name_parses_valid_dates(year in 2020i32..=2030, month in 1u32..=12, day in 1u32..=28) {
        let date = format!("{:04}-{:02}-{:02}", year, month, day);
        prop_assert!(weekday_name(&date).is_some());
    }
}
