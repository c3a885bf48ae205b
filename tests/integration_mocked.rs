/// Integration tests with mocked external APIs
/// Exercises the notification, spreadsheet-export and voice-platform
/// services against wiremock servers instead of real endpoints.
use ari_platform_api::config::Config;
use ari_platform_api::models::{Campaign, Client, Lead};
use ari_platform_api::services::{NotificationService, SheetsService, VoicePlatformService};
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test config with every external base URL pointed at
/// the given mock server.
fn create_test_config(mock_uri: String) -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        port: 3000,
        admin_email: "admin@example.com".to_string(),
        admin_password: "password123".to_string(),
        voice_webhook_secret: None,
        voice_api_base_url: mock_uri.clone(),
        voice_api_token: Some("test-voice-token".to_string()),
        sendgrid_base_url: mock_uri.clone(),
        sendgrid_api_key: Some("test-sendgrid-key".to_string()),
        notify_from_email: "leads@example.com".to_string(),
        twilio_base_url: mock_uri.clone(),
        twilio_account_sid: None,
        twilio_auth_token: None,
        twilio_from_number: None,
        sheets_export_url: Some(format!("{}/sheets/append", mock_uri)),
        public_base_url: "http://localhost:3000".to_string(),
    }
}

fn test_campaign(notify_on_submit: bool) -> Campaign {
    Campaign {
        id: "camp-1".to_string(),
        client_id: "client-1".to_string(),
        name: "Spring Booking Push".to_string(),
        description: "".to_string(),
        campaign_type: "lead-capture".to_string(),
        status: "active".to_string(),
        target_audience: json!({}),
        lead_magnet: None,
        landing_page: json!({ "notifyOnSubmit": notify_on_submit }),
        thank_you_page: json!({}),
        form: json!({ "fields": [] }),
        auto_responder: json!({ "enabled": false, "subject": "", "body": "" }),
        stats: json!({ "views": 0, "submissions": 0 }),
        settings: json!({}),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        published_at: None,
    }
}

fn test_lead() -> Lead {
    Lead {
        id: "lead-1".to_string(),
        client_id: "client-1".to_string(),
        campaign_id: Some("camp-1".to_string()),
        name: "Alice Example".to_string(),
        email: "alice@example.com".to_string(),
        phone: "+15550100".to_string(),
        company: "Acme".to_string(),
        interest: None,
        budget: None,
        timeline: None,
        lead_quality: "warm".to_string(),
        notes: "".to_string(),
        status: "new".to_string(),
        source: "Lead Gen Campaign".to_string(),
        call_id: None,
        score: 70,
        form_responses: None,
        tracking: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_client() -> Client {
    Client {
        client_id: "client-1".to_string(),
        business_name: "ABC Healthcare".to_string(),
        contact_name: "Dana".to_string(),
        email: "contact@abchealthcare.com".to_string(),
        phone: "+15550111".to_string(),
        industry: "healthcare".to_string(),
        website: "".to_string(),
        address: "".to_string(),
        contact_title: "".to_string(),
        contact_email: "dana@abchealthcare.com".to_string(),
        contact_phone: "".to_string(),
        login_email: "contact@abchealthcare.com".to_string(),
        password_hash: "".to_string(),
        services: json!({ "aiReceptionist": { "enabled": true } }),
        status: "active".to_string(),
        notes: "".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_email_notification_posts_to_mail_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer test-sendgrid-key"))
        .and(body_partial_json(json!({
            "subject": "New Lead: Alice Example"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = NotificationService::new(&config);

    let result = service
        .send_lead_notification(&test_campaign(true), Some(&test_client()), &test_lead())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_email_notification_skipped_when_unconfigured() {
    let mock_server = MockServer::start().await;

    // No mail mock mounted: an attempted send would fail the request and
    // surface as an error, so Ok proves the channel degraded to a log line.
    let mut config = create_test_config(mock_server.uri());
    config.sendgrid_api_key = None;
    let service = NotificationService::new(&config);

    let result = service
        .send_lead_notification(&test_campaign(true), Some(&test_client()), &test_lead())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_email_notification_failure_surfaces_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = NotificationService::new(&config);

    let result = service
        .send_lead_notification(&test_campaign(true), Some(&test_client()), &test_lead())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_welcome_email_substitutes_template_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(body_partial_json(json!({
            "subject": "Thanks!",
            "content": [{ "type": "text/plain", "value": "Hi Alice Example" }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = NotificationService::new(&config);

    let mut campaign = test_campaign(false);
    campaign.auto_responder = json!({
        "enabled": true,
        "subject": "Thanks!",
        "body": "Hi {{name}}"
    });

    let result = service
        .send_welcome_email_to_lead(&campaign, &test_lead())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_welcome_email_noop_when_auto_responder_disabled() {
    let mock_server = MockServer::start().await;

    let config = create_test_config(mock_server.uri());
    let service = NotificationService::new(&config);

    let result = service
        .send_welcome_email_to_lead(&test_campaign(false), &test_lead())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_sheets_export_posts_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sheets/append"))
        .and(body_partial_json(json!({
            "clientId": "client-1",
            "sheet": "Leads"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = SheetsService::new(&config);

    let result = service.append_lead("client-1", &test_lead()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_sheets_export_skipped_when_unconfigured() {
    let mock_server = MockServer::start().await;

    let mut config = create_test_config(mock_server.uri());
    config.sheets_export_url = None;
    let service = SheetsService::new(&config);

    let result = service.append_lead("client-1", &test_lead()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_assistant_returns_platform_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assistant"))
        .and(header("authorization", "Bearer test-voice-token"))
        .and(body_partial_json(json!({
            "name": "ABC Healthcare - AI Receptionist"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "asst-42",
            "name": "ABC Healthcare - AI Receptionist"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = VoicePlatformService::new(&config);

    let assistant = service
        .create_assistant(&test_client(), &json!({ "bookingEnabled": true }))
        .await
        .unwrap();

    assert_eq!(assistant["id"], json!("asst-42"));
}

#[tokio::test]
async fn test_create_assistant_requires_token() {
    let mock_server = MockServer::start().await;

    let mut config = create_test_config(mock_server.uri());
    config.voice_api_token = None;
    let service = VoicePlatformService::new(&config);

    let result = service
        .create_assistant(&test_client(), &json!({}))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_purchase_phone_number() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/phone-number/buy"))
        .and(body_partial_json(json!({
            "assistantId": "asst-42",
            "areaCode": "415"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "phone-7",
            "number": "+14155550123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = VoicePlatformService::new(&config);

    let number = service
        .purchase_phone_number("asst-42", Some("415"))
        .await
        .unwrap();

    assert_eq!(number["number"], json!("+14155550123"));
}

#[tokio::test]
async fn test_list_available_phone_numbers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/phone-number/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": "+14155550123" },
            { "number": "+14155550124" }
        ])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = VoicePlatformService::new(&config);

    let numbers = service.list_available_phone_numbers(None).await.unwrap();
    assert_eq!(numbers.as_array().unwrap().len(), 2);
}
