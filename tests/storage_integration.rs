use std::env;
use std::sync::Arc;

use ari_platform_api::capture_handler::capture_lead;
use ari_platform_api::capture_models::CaptureRequest;
use ari_platform_api::config::Config;
use ari_platform_api::data::db_storage::{CallStore, CampaignStore, LeadStore};
use ari_platform_api::db::Database;
use ari_platform_api::errors::AppError;
use ari_platform_api::handlers::AppState;
use ari_platform_api::models::CreateCampaignRequest;
use ari_platform_api::webhook_handler::voice_webhook;
use ari_platform_api::webhook_models::VoiceWebhookPayload;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use serde_json::json;
use uuid::Uuid;

/// Integration tests against a real database.
/// Marked ignored to avoid running against production by accident; set
/// TEST_DATABASE_URL to run.

fn test_config() -> Config {
    Config {
        database_url: "postgresql://unused".to_string(),
        port: 3000,
        admin_email: "admin@example.com".to_string(),
        admin_password: "password123".to_string(),
        voice_webhook_secret: None,
        voice_api_base_url: "http://127.0.0.1:1".to_string(),
        voice_api_token: None,
        sendgrid_base_url: "http://127.0.0.1:1".to_string(),
        sendgrid_api_key: None,
        notify_from_email: "leads@example.com".to_string(),
        twilio_base_url: "http://127.0.0.1:1".to_string(),
        twilio_account_sid: None,
        twilio_auth_token: None,
        twilio_from_number: None,
        sheets_export_url: None,
        public_base_url: "http://localhost:3000".to_string(),
    }
}

async fn test_state() -> anyhow::Result<Arc<AppState>> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    Ok(Arc::new(AppState {
        db: db.pool.clone(),
        config: test_config(),
    }))
}

fn transcript_payload(call_id: &str, client_id: &str, text: &str) -> VoiceWebhookPayload {
    serde_json::from_value(json!({
        "message": {
            "type": "transcript",
            "call": { "id": call_id, "metadata": { "clientId": client_id } },
            "transcript": { "text": text }
        }
    }))
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn partial_transcripts_collapse_to_one_document() -> anyhow::Result<()> {
    let state = test_state().await?;
    let call_id = format!("call-{}", Uuid::new_v4());
    let client_id = format!("client-{}", Uuid::new_v4());

    for text in ["Hello, thank you for", "Hello, thank you for calling ABC."] {
        voice_webhook(
            State(state.clone()),
            HeaderMap::new(),
            Json(transcript_payload(&call_id, &client_id, text)),
        )
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    }

    let store = CallStore::new(state.db.clone());
    assert_eq!(store.count_for_call(&call_id).await.unwrap(), 1);

    let doc = store.get_by_call(&call_id).await.unwrap().unwrap();
    assert!(doc.is_partial);
    assert_eq!(
        doc.transcript.as_deref(),
        Some("Hello, thank you for calling ABC.")
    );

    Ok(())
}

#[tokio::test]
#[ignore]
async fn end_of_call_without_contact_info_creates_no_lead() -> anyhow::Result<()> {
    let state = test_state().await?;
    let call_id = format!("call-{}", Uuid::new_v4());
    let client_id = format!("client-{}", Uuid::new_v4());

    let payload: VoiceWebhookPayload = serde_json::from_value(json!({
        "message": {
            "type": "end-of-call-report",
            "call": { "id": call_id, "metadata": { "clientId": client_id } },
            "analysis": {
                "summary": "Caller asked about office hours",
                "structuredData": { "company": "Acme" }
            },
            "artifact": { "transcript": "AI: Hello..." }
        }
    }))?;

    voice_webhook(State(state.clone()), HeaderMap::new(), Json(payload))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let calls = CallStore::new(state.db.clone());
    assert_eq!(calls.count_for_call(&call_id).await.unwrap(), 1);

    let leads = LeadStore::new(state.db.clone())
        .list(Some(&client_id))
        .await
        .unwrap();
    assert!(leads.is_empty());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn end_of_call_with_contact_info_creates_scored_lead() -> anyhow::Result<()> {
    let state = test_state().await?;
    let call_id = format!("call-{}", Uuid::new_v4());
    let client_id = format!("client-{}", Uuid::new_v4());

    let payload: VoiceWebhookPayload = serde_json::from_value(json!({
        "message": {
            "type": "end-of-call-report",
            "call": {
                "id": call_id,
                "metadata": { "clientId": client_id },
                "customer": { "number": "+15550100" }
            },
            "analysis": {
                "summary": "Hot prospect, wants a quote",
                "structuredData": {
                    "name": "Jane Doe",
                    "email": "jane@example.com",
                    "budget": "10k",
                    "leadQuality": "hot"
                }
            }
        }
    }))?;

    voice_webhook(State(state.clone()), HeaderMap::new(), Json(payload))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let leads = LeadStore::new(state.db.clone())
        .list(Some(&client_id))
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);

    let lead = &leads[0];
    assert_eq!(lead.name, "Jane Doe");
    assert_eq!(lead.source, "ai-receptionist");
    assert_eq!(lead.call_id.as_deref(), Some(call_id.as_str()));
    // Phone falls back to the caller id when structured data has none.
    assert_eq!(lead.phone, "+15550100");
    // 50 base + 10 email + 15 budget + 20 hot (no structured phone)
    assert_eq!(lead.score, 95);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn capture_rejects_draft_and_paused_campaigns() -> anyhow::Result<()> {
    let state = test_state().await?;
    let client_id = format!("client-{}", Uuid::new_v4());

    let campaigns = CampaignStore::new(state.db.clone());
    let campaign = campaigns
        .create(&CreateCampaignRequest {
            client_id: Some(client_id.clone()),
            name: Some("Draft campaign".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(campaign.status, "draft");

    let request: CaptureRequest = serde_json::from_value(json!({
        "campaignId": campaign.id,
        "formData": { "1": "Alice" }
    }))?;

    let result = capture_lead(State(state.clone()), HeaderMap::new(), Json(request.clone())).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // paused campaigns are rejected the same way
    campaigns.publish(&campaign.id).await.unwrap();
    campaigns.pause(&campaign.id).await.unwrap();

    let result = capture_lead(State(state.clone()), HeaderMap::new(), Json(request)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let leads = LeadStore::new(state.db.clone())
        .list(Some(&client_id))
        .await
        .unwrap();
    assert!(leads.is_empty());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn capture_on_active_campaign_creates_lead_and_bumps_stats() -> anyhow::Result<()> {
    let state = test_state().await?;
    let client_id = format!("client-{}", Uuid::new_v4());

    let campaigns = CampaignStore::new(state.db.clone());
    let campaign = campaigns
        .create(&CreateCampaignRequest {
            client_id: Some(client_id.clone()),
            name: Some("Live campaign".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    campaigns.publish(&campaign.id).await.unwrap();

    let request: CaptureRequest = serde_json::from_value(json!({
        "campaignId": campaign.id,
        "formData": { "1": "Alice", "name": "Bob", "2": "alice@example.com" },
        "tracking": { "utm_source": "google" }
    }))?;

    let (status, body) = capture_lead(State(state.clone()), HeaderMap::new(), Json(request))
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body.0["success"], json!(true));

    let leads = LeadStore::new(state.db.clone())
        .list(Some(&client_id))
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);

    let lead = &leads[0];
    // numeric form key wins over the named one
    assert_eq!(lead.name, "Alice");
    assert_eq!(lead.email, "alice@example.com");
    assert_eq!(lead.source, "Lead Gen Campaign");
    assert_eq!(lead.score, 70);
    assert_eq!(
        lead.tracking.as_ref().and_then(|t| t.get("ip")).cloned(),
        Some(json!("unknown"))
    );

    let refreshed = campaigns.get(&campaign.id).await.unwrap().unwrap();
    assert_eq!(refreshed.stats["submissions"], json!(1));

    Ok(())
}
