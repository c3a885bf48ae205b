use crate::capture_models::CaptureRequest;
use crate::db_storage::{BillingStore, CampaignStore, ClientStore, LeadStore, NewLead};
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::services::{NotificationService, SheetsService};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Public lead capture endpoint.
///
/// Flow:
/// 1. Validate presence of campaignId and formData.
/// 2. Resolve the campaign; it must exist and be active.
/// 3. Capture the requester IP from forwarded headers.
/// 4. Persist the lead synchronously.
/// 5. Bump campaign/billing counters (failure-tolerant).
/// 6. Fire-and-forget spreadsheet export and notifications.
pub async fn capture_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CaptureRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // Step 1: presence checks
    let (Some(campaign_id), Some(form_data)) = (payload.campaign_id, payload.form_data) else {
        return Err(AppError::BadRequest("Missing required data".to_string()));
    };

    // Step 2: campaign must exist and be active
    let campaign_store = CampaignStore::new(state.db.clone());
    let campaign = campaign_store
        .get(&campaign_id)
        .await?
        .filter(|c| c.status == "active")
        .ok_or_else(|| AppError::BadRequest("Campaign is not active".to_string()))?;

    // Step 3: requester IP for compliance tracking
    let ip = client_ip(&headers);

    let mut tracking = match payload.tracking {
        Some(Value::Object(map)) => Value::Object(map),
        _ => json!({}),
    };
    tracking["ip"] = json!(ip);
    tracking["capturedAt"] = json!(Utc::now().to_rfc3339());

    // Step 4: persist the lead synchronously
    let lead_store = LeadStore::new(state.db.clone());
    let lead = lead_store
        .insert(NewLead {
            client_id: campaign.client_id.clone(),
            campaign_id: Some(campaign_id.clone()),
            name: form_data.name(),
            email: form_data.email(),
            phone: form_data.phone(),
            company: form_data.company(),
            source: Some("Lead Gen Campaign".to_string()),
            status: Some("new".to_string()),
            score: Some(70),
            form_responses: Some(form_data.raw().clone()),
            tracking: Some(tracking),
            ..Default::default()
        })
        .await?;

    tracing::info!(
        "Captured lead {} for campaign {} (client {})",
        lead.id,
        campaign_id,
        campaign.client_id
    );

    // Step 5: delivery counters; failures are logged, never surfaced
    if let Err(e) = campaign_store.increment_submissions(&campaign_id).await {
        tracing::error!("Failed to bump campaign stats: {}", e);
    }
    let billing_store = BillingStore::new(state.db.clone());
    if let Err(e) = billing_store.track_delivery(&campaign.client_id).await {
        tracing::error!("Failed to track lead delivery: {}", e);
    }

    // Step 6: spreadsheet export + notifications, detached from the request.
    // These may still be in flight (or fail silently) after the response.
    spawn_post_capture_jobs(state.clone(), campaign, lead.clone());

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "leadId": lead.id,
            "message": "Lead captured successfully"
        })),
    ))
}

/// Requester IP from proxy headers, sentinel "unknown" when absent.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Detached best-effort side effects: no ordering guarantee against the
/// response, no retry, no timeout.
fn spawn_post_capture_jobs(
    state: Arc<AppState>,
    campaign: crate::models::Campaign,
    lead: crate::models::Lead,
) {
    tokio::spawn(async move {
        let sheets = SheetsService::new(&state.config);
        if let Err(e) = sheets.append_lead(&campaign.client_id, &lead).await {
            tracing::error!("Spreadsheet export failed: {}", e);
        }

        let notify_on_submit = campaign
            .landing_page
            .get("notifyOnSubmit")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let notifications = NotificationService::new(&state.config);
        if notify_on_submit {
            let client = match ClientStore::new(state.db.clone())
                .get(&campaign.client_id)
                .await
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Failed to load client for notification: {}", e);
                    None
                }
            };

            if let Err(e) = notifications
                .send_lead_notification(&campaign, client.as_ref(), &lead)
                .await
            {
                tracing::error!("Notification failed: {}", e);
            }
        }

        if let Err(e) = notifications.send_welcome_email_to_lead(&campaign, &lead).await {
            tracing::error!("Welcome email failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), "198.51.100.2");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
