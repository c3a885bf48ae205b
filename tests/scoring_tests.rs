/// Unit tests for lead scoring, quote generation and form-field resolution.
use ari_platform_api::capture_models::FormData;
use ari_platform_api::scoring::{calculate_lead_score, unit_price_for, weekday_name};
use ari_platform_api::webhook_handler::{check_availability, generate_quote};
use ari_platform_api::webhook_models::StructuredData;
use serde_json::json;

fn structured(v: serde_json::Value) -> StructuredData {
    serde_json::from_value(v).unwrap()
}

#[cfg(test)]
mod lead_score_tests {
    use super::*;

    #[test]
    fn test_base_score() {
        assert_eq!(calculate_lead_score(&structured(json!({}))), 50);
    }

    #[test]
    fn test_email_adds_ten() {
        assert_eq!(calculate_lead_score(&structured(json!({"email": "x"}))), 60);
    }

    #[test]
    fn test_email_and_phone_add_twenty() {
        assert_eq!(
            calculate_lead_score(&structured(json!({"email": "x", "phone": "y"}))),
            70
        );
    }

    #[test]
    fn test_budget_and_timeline_add_thirty() {
        assert_eq!(
            calculate_lead_score(&structured(json!({"budget": 1, "timeline": 1}))),
            80
        );
    }

    #[test]
    fn test_hot_label_adds_twenty_warm_adds_ten() {
        let base = json!({"email": "x"});
        let hot = json!({"email": "x", "leadQuality": "hot"});
        let warm = json!({"email": "x", "leadQuality": "warm"});

        let base_score = calculate_lead_score(&structured(base));
        assert_eq!(calculate_lead_score(&structured(hot)), base_score + 20);
        assert_eq!(calculate_lead_score(&structured(warm)), base_score + 10);
    }

    #[test]
    fn test_quality_labels_are_mutually_exclusive() {
        // "hot" wins outright; the warm branch is never also applied.
        assert_eq!(
            calculate_lead_score(&structured(json!({"leadQuality": "hot"}))),
            70
        );
        assert_eq!(
            calculate_lead_score(&structured(json!({"leadQuality": "warm"}))),
            60
        );
    }

    #[test]
    fn test_never_exceeds_one_hundred() {
        let maxed = json!({
            "email": "a@b.c",
            "phone": "+15550100",
            "budget": "50k",
            "timeline": "this month",
            "leadQuality": "hot"
        });
        assert_eq!(calculate_lead_score(&structured(maxed)), 100);
    }

    #[test]
    fn test_unknown_quality_label_scores_nothing() {
        assert_eq!(
            calculate_lead_score(&structured(json!({"leadQuality": "cold"}))),
            50
        );
        assert_eq!(
            calculate_lead_score(&structured(json!({"leadQuality": 7}))),
            50
        );
    }
}

#[cfg(test)]
mod quote_tests {
    use super::*;

    #[test]
    fn test_premium_quantity_three() {
        let result = generate_quote(&json!({"service": "premium", "quantity": 3}));
        assert_eq!(result["quote"]["unitPrice"], json!(1000));
        assert_eq!(result["quote"]["total"], json!(3000));
        assert!(result["message"].as_str().unwrap().contains("3000"));
        assert_eq!(result["quote"]["validFor"], json!("30 days"));
    }

    #[test]
    fn test_unknown_service_falls_back_to_standard() {
        let result = generate_quote(&json!({"service": "unknown"}));
        assert_eq!(result["quote"]["unitPrice"], json!(500));
        assert_eq!(result["quote"]["total"], json!(500));
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(unit_price_for(Some("standard")), 500);
        assert_eq!(unit_price_for(Some("premium")), 1000);
        assert_eq!(unit_price_for(Some("enterprise")), 2500);
        assert_eq!(unit_price_for(None), 500);
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let result = generate_quote(&json!({"service": "enterprise"}));
        assert_eq!(result["quote"]["quantity"], json!(1));
        assert_eq!(result["quote"]["total"], json!(2500));
    }
}

#[cfg(test)]
mod availability_tests {
    use super::*;

    #[test]
    fn test_six_slots_one_unavailable() {
        let result = check_availability(&json!({"date": "2025-03-07"}));
        let slots = result["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 6);
        assert_eq!(
            slots
                .iter()
                .filter(|s| s["available"] == json!(false))
                .count(),
            1
        );
    }

    #[test]
    fn test_message_names_the_weekday() {
        // 2025-03-07 is a Friday.
        let result = check_availability(&json!({"date": "2025-03-07"}));
        assert_eq!(
            result["message"],
            json!("We have availability on Friday")
        );
        assert_eq!(result["available"], json!(true));
    }

    #[test]
    fn test_weekday_helper() {
        assert_eq!(weekday_name("2025-03-03"), Some("Monday"));
        assert_eq!(weekday_name("2025-03-09"), Some("Sunday"));
        assert_eq!(weekday_name("03/09/2025"), None);
    }
}

#[cfg(test)]
mod form_resolution_tests {
    use super::*;

    #[test]
    fn test_numeric_key_wins() {
        let data = FormData(json!({"1": "Alice", "name": "Bob"}));
        assert_eq!(data.name(), "Alice");
    }

    #[test]
    fn test_named_fallback_and_defaults() {
        let data = FormData(json!({"email": "e@example.com"}));
        assert_eq!(data.name(), "Unknown");
        assert_eq!(data.email(), "e@example.com");
        assert_eq!(data.phone(), "");
        assert_eq!(data.company(), "");
    }

    #[test]
    fn test_all_numeric_fields() {
        let data = FormData(json!({
            "1": "Alice",
            "2": "alice@example.com",
            "3": "+15550100",
            "4": "Acme"
        }));
        assert_eq!(data.name(), "Alice");
        assert_eq!(data.email(), "alice@example.com");
        assert_eq!(data.phone(), "+15550100");
        assert_eq!(data.company(), "Acme");
    }
}
