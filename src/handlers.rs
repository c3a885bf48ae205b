use crate::config::Config;
use crate::db_storage::{
    AppointmentStore, BillingStore, CallStore, CampaignStore, ClientStore, ConfigStore,
    ConfigTable, LeadStore,
};
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::services::VoicePlatformService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

/// sha-256 hex digest used for portal password storage.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Random temporary portal password.
pub fn generate_password(length: usize) -> String {
    const CHARSET: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

    let mut bytes = Vec::with_capacity(length + 16);
    while bytes.len() < length {
        bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    }

    bytes
        .into_iter()
        .take(length)
        .map(|b| CHARSET[b as usize % CHARSET.len()] as char)
        .collect()
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ari-platform-api",
            "version": "0.1.0"
        })),
    )
}

// ============ Auth ============
//
// Tokens are opaque uuids handed back on credential match; nothing on the
// API surface validates or expires them.

/// POST /api/auth/admin/login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.email != state.config.admin_email
        || payload.password != state.config.admin_password
    {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = Uuid::new_v4().to_string();

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": {
            "id": "admin-001",
            "email": payload.email,
            "name": "Admin User",
            "role": "admin"
        }
    })))
}

/// POST /api/auth/client/login
pub async fn client_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let store = ClientStore::new(state.db.clone());
    let client = store
        .find_by_login(&payload.email)
        .await?
        .filter(|c| c.password_hash == hash_password(&payload.password))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = Uuid::new_v4().to_string();

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": {
            "id": client.client_id,
            "email": client.login_email,
            "businessName": client.business_name,
            "role": "client"
        }
    })))
}

/// POST /api/auth/admin/generate-credentials
///
/// Rotates a client's portal password; the plaintext is returned once.
pub async fn generate_credentials(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateCredentialsRequest>,
) -> Result<Json<Value>, AppError> {
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID is required".to_string()))?;

    let store = ClientStore::new(state.db.clone());
    let client = store
        .get(&client_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let password = generate_password(12);
    store
        .set_portal_credentials(&client_id, payload.email.as_deref(), &hash_password(&password))
        .await?;

    Ok(Json(json!({
        "success": true,
        "credentials": {
            "clientId": client_id,
            "email": payload.email.unwrap_or(client.login_email),
            "password": password
        }
    })))
}

// ============ Clients ============

/// GET /api/clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let clients = ClientStore::new(state.db.clone()).list().await?;

    Ok(Json(json!({
        "success": true,
        "clients": clients
    })))
}

/// POST /api/clients
///
/// Generates the portal password and returns it once on the created record.
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.business_name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Business name and email are required".to_string(),
        ));
    }

    let password = generate_password(12);
    let store = ClientStore::new(state.db.clone());
    let client = store.create(&payload, &hash_password(&password)).await?;

    tracing::info!("Created client {} ({})", client.client_id, client.business_name);

    let mut client_json = serde_json::to_value(&client)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize client: {}", e)))?;
    client_json["temporaryPassword"] = json!(password);

    Ok(Json(json!({
        "success": true,
        "client": client_json
    })))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let client = ClientStore::new(state.db.clone())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "client": client
    })))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<Value>, AppError> {
    let store = ClientStore::new(state.db.clone());
    let updated = store.update(&id, &payload).await?;

    if !updated {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    let client = store.get(&id).await?;

    Ok(Json(json!({
        "success": true,
        "client": client
    })))
}

/// DELETE /api/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = ClientStore::new(state.db.clone()).delete(&id).await?;

    if !deleted {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

// ============ Per-product configuration ============

/// GET /api/clients/:id/ai-receptionist
pub async fn get_receptionist_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let config = ConfigStore::new(state.db.clone())
        .get_or_init(
            ConfigTable::Receptionist,
            &id,
            default_receptionist_config(&id),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "config": config
    })))
}

/// PUT /api/clients/:id/ai-receptionist
pub async fn put_receptionist_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if let Value::Object(ref mut map) = payload {
        map.insert("clientId".to_string(), json!(id));
    }

    ConfigStore::new(state.db.clone())
        .put(ConfigTable::Receptionist, &id, &payload)
        .await?;

    Ok(Json(json!({
        "success": true,
        "config": payload
    })))
}

/// GET /api/clients/:id/booking-accelerator
pub async fn get_booking_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let config = ConfigStore::new(state.db.clone())
        .get_or_init(
            ConfigTable::Booking,
            &id,
            default_booking_config(&id, &state.config.public_base_url),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "config": config
    })))
}

/// PUT /api/clients/:id/booking-accelerator
pub async fn put_booking_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if let Value::Object(ref mut map) = payload {
        map.insert("clientId".to_string(), json!(id));
    }

    ConfigStore::new(state.db.clone())
        .put(ConfigTable::Booking, &id, &payload)
        .await?;

    Ok(Json(json!({
        "success": true,
        "config": payload
    })))
}

// ============ Billing ============

/// GET /api/admin/billing/:id (id = client id)
pub async fn get_billing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let billing = BillingStore::new(state.db.clone()).get_active(&id).await?;

    Ok(Json(json!({
        "success": true,
        "billing": billing
    })))
}

/// POST /api/admin/billing/:id
///
/// Updates the client's active record when one exists, creates one
/// otherwise. Nothing guards concurrent creates; the one-active-per-client
/// invariant is assumed, not enforced.
pub async fn upsert_billing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertBillingRequest>,
) -> Result<Json<Value>, AppError> {
    let store = BillingStore::new(state.db.clone());

    match store.get_active(&id).await? {
        Some(existing) => {
            store.update(&existing.id, &payload).await?;
        }
        None => {
            store.create(&id, &payload).await?;
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Billing configuration saved"
    })))
}

// ============ Client portal: dashboard, calls, leads ============

/// GET /api/client/dashboard?clientId=
///
/// Aggregates real rows from the calls/appointments/leads/billing
/// collections.
pub async fn client_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientScopeQuery>,
) -> Result<Json<Value>, AppError> {
    let client_id = params
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID required".to_string()))?;

    let calls = CallStore::new(state.db.clone());
    let calls_received = calls
        .count_completed(&client_id)
        .await
        .context("Failed to count calls")?;
    let avg_duration = calls.avg_duration_ms(&client_id).await?;

    let appointments_booked = AppointmentStore::new(state.db.clone())
        .count(&client_id)
        .await
        .context("Failed to count appointments")?;
    let leads_captured = LeadStore::new(state.db.clone())
        .count(&client_id)
        .await
        .context("Failed to count leads")?;

    let conversion_rate = if calls_received > 0 {
        format!(
            "{:.1}%",
            appointments_booked as f64 / calls_received as f64 * 100.0
        )
    } else {
        "0.0%".to_string()
    };

    let avg_call_duration = match avg_duration {
        Some(ms) if ms > 0.0 => {
            let total_secs = (ms / 1000.0).round() as i64;
            format!("{}m {}s", total_secs / 60, total_secs % 60)
        }
        _ => "0m 0s".to_string(),
    };

    let revenue = match BillingStore::new(state.db.clone())
        .get_active(&client_id)
        .await?
    {
        Some(billing) => {
            format!("${:.0}", billing.leads_delivered as f64 * billing.per_lead_rate)
        }
        None => "$0".to_string(),
    };

    let stats = DashboardStats {
        calls_received,
        appointments_booked,
        leads_captured,
        conversion_rate,
        avg_call_duration,
        revenue,
    };

    Ok(Json(json!({
        "success": true,
        "stats": stats
    })))
}

/// GET /api/client/calls?clientId=
pub async fn client_calls(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientScopeQuery>,
) -> Result<Json<Value>, AppError> {
    let client_id = params
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID required".to_string()))?;

    let calls = CallStore::new(state.db.clone())
        .list(Some(&client_id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "calls": calls
    })))
}

/// GET /api/client/leads?clientId=
pub async fn client_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientScopeQuery>,
) -> Result<Json<Value>, AppError> {
    let client_id = params
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID is required".to_string()))?;

    let leads = LeadStore::new(state.db.clone())
        .list(Some(&client_id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "leads": leads
    })))
}

/// PUT /api/client/leads — merge-update by lead id.
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<Json<Value>, AppError> {
    let lead_id = payload
        .lead_id
        .clone()
        .ok_or_else(|| AppError::BadRequest("Lead ID is required".to_string()))?;

    let success = LeadStore::new(state.db.clone())
        .update(&lead_id, &payload)
        .await?;

    Ok(Json(json!({ "success": success })))
}

/// POST /api/client/leads — append a note.
pub async fn add_lead_note(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LeadNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(lead_id), Some(note)) = (payload.lead_id, payload.note) else {
        return Err(AppError::BadRequest(
            "Lead ID and note are required".to_string(),
        ));
    };

    let success = LeadStore::new(state.db.clone())
        .append_note(&lead_id, &note)
        .await?;

    Ok(Json(json!({ "success": success })))
}

// ============ Campaigns ============

/// GET /api/client/lead-gen/campaigns?clientId=
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientScopeQuery>,
) -> Result<Json<Value>, AppError> {
    let client_id = params
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID is required".to_string()))?;

    let campaigns = CampaignStore::new(state.db.clone())
        .list(Some(&client_id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "campaigns": campaigns
    })))
}

/// POST /api/client/lead-gen/campaigns
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.client_id.as_deref().unwrap_or("").is_empty()
        || payload.name.as_deref().unwrap_or("").is_empty()
    {
        return Err(AppError::BadRequest(
            "Client ID and name are required".to_string(),
        ));
    }

    let campaign = CampaignStore::new(state.db.clone()).create(&payload).await?;

    Ok(Json(json!({
        "success": true,
        "campaign": campaign
    })))
}

/// GET /api/client/lead-gen/campaigns/:id
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let campaign = CampaignStore::new(state.db.clone())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "campaign": campaign
    })))
}

/// PATCH /api/client/lead-gen/campaigns/:id
pub async fn patch_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCampaignRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = CampaignStore::new(state.db.clone())
        .update(&id, &payload)
        .await?;

    if !updated {
        return Err(AppError::NotFound(
            "Campaign not found or update failed".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Campaign updated successfully"
    })))
}

/// DELETE /api/client/lead-gen/campaigns/:id
pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = CampaignStore::new(state.db.clone()).delete(&id).await?;

    if !deleted {
        return Err(AppError::NotFound(
            "Campaign not found or delete failed".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Campaign deleted successfully"
    })))
}

/// POST /api/client/lead-gen/campaigns/:id/publish
pub async fn publish_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let published = CampaignStore::new(state.db.clone()).publish(&id).await?;

    if !published {
        return Err(AppError::NotFound("Campaign not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Campaign published"
    })))
}

/// POST /api/client/lead-gen/campaigns/:id/pause
pub async fn pause_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let paused = CampaignStore::new(state.db.clone()).pause(&id).await?;

    if !paused {
        return Err(AppError::NotFound("Campaign not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Campaign paused"
    })))
}

/// GET /api/public/campaigns/:id — public projection only.
pub async fn public_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let campaign = CampaignStore::new(state.db.clone())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "campaign": {
            "id": campaign.id,
            "name": campaign.name,
            "landingPage": campaign.landing_page,
            "status": campaign.status
        }
    })))
}

// ============ Knowledge base ============

/// GET /api/client/knowledge-base?clientId=
pub async fn get_knowledge_base(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientScopeQuery>,
) -> Result<Json<Value>, AppError> {
    let client_id = params
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID is required".to_string()))?;

    let client = ClientStore::new(state.db.clone())
        .get(&client_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let knowledge_base = client
        .services
        .get("aiReceptionist")
        .and_then(|s| s.get("knowledgeBase"))
        .cloned()
        .unwrap_or_else(|| json!({ "faqs": [], "services": [], "staff": [] }));

    Ok(Json(json!({
        "success": true,
        "knowledgeBase": knowledge_base
    })))
}

/// POST /api/client/knowledge-base
pub async fn put_knowledge_base(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<KnowledgeBaseRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(client_id), Some(knowledge_base)) = (payload.client_id, payload.knowledge_base)
    else {
        return Err(AppError::BadRequest(
            "Client ID and knowledge base are required".to_string(),
        ));
    };

    let saved = ClientStore::new(state.db.clone())
        .merge_receptionist_service(&client_id, &json!({ "knowledgeBase": knowledge_base }))
        .await?;

    if !saved {
        return Err(AppError::InternalError(
            "Failed to save knowledge base".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Knowledge base saved successfully"
    })))
}

// ============ Receptionist activation & phone numbers ============

/// POST /api/client/ai-receptionist/activate
///
/// Creates the voice-platform assistant, optionally purchases a phone
/// number, and merges the resulting ids into the client's services blob.
pub async fn activate_receptionist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActivateReceptionistRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(client_id), Some(config)) = (payload.client_id, payload.config) else {
        return Err(AppError::BadRequest(
            "Client ID and config are required".to_string(),
        ));
    };

    let store = ClientStore::new(state.db.clone());
    let client = store
        .get(&client_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    tracing::info!("Creating voice assistant for client {}...", client_id);

    let voice = VoicePlatformService::new(&state.config);
    let assistant = voice.create_assistant(&client, &config).await?;
    let assistant_id = assistant
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::ExternalApiError("Assistant response missing id".to_string())
        })?
        .to_string();

    tracing::info!("Assistant created: {}", assistant_id);

    let phone_number = if payload.purchase_phone {
        tracing::info!("Purchasing phone number...");
        let number = voice
            .purchase_phone_number(&assistant_id, payload.area_code.as_deref())
            .await?;
        tracing::info!(
            "Phone number purchased: {}",
            number.get("number").and_then(|v| v.as_str()).unwrap_or("?")
        );
        Some(number)
    } else {
        None
    };

    let mut service_patch = json!({
        "assistantId": assistant_id,
        "setupComplete": true,
        "config": config,
        "configuredAt": chrono::Utc::now().to_rfc3339()
    });
    if let Some(ref number) = phone_number {
        service_patch["phoneNumber"] = number.get("number").cloned().unwrap_or(Value::Null);
        service_patch["phoneNumberId"] = number.get("id").cloned().unwrap_or(Value::Null);
    }
    store
        .merge_receptionist_service(&client_id, &service_patch)
        .await?;

    Ok(Json(json!({
        "success": true,
        "assistant": {
            "id": assistant_id,
            "name": assistant.get("name").cloned().unwrap_or(Value::Null)
        },
        "phoneNumber": phone_number.map(|n| json!({
            "number": n.get("number").cloned().unwrap_or(Value::Null),
            "id": n.get("id").cloned().unwrap_or(Value::Null)
        }))
    })))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCodeQuery {
    pub area_code: Option<String>,
}

/// GET /api/client/phone-number?areaCode=
pub async fn list_phone_numbers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AreaCodeQuery>,
) -> Result<Json<Value>, AppError> {
    let voice = VoicePlatformService::new(&state.config);
    let numbers = voice
        .list_available_phone_numbers(params.area_code.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "numbers": numbers
    })))
}

/// POST /api/client/phone-number — purchase for the configured assistant.
pub async fn purchase_phone_number(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PurchasePhoneRequest>,
) -> Result<Json<Value>, AppError> {
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::BadRequest("Client ID is required".to_string()))?;

    let store = ClientStore::new(state.db.clone());
    let client = store
        .get(&client_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let assistant_id = client
        .services
        .get("aiReceptionist")
        .and_then(|s| s.get("assistantId"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("AI Receptionist not configured yet".to_string())
        })?
        .to_string();

    let voice = VoicePlatformService::new(&state.config);
    let number = voice
        .purchase_phone_number(&assistant_id, payload.area_code.as_deref())
        .await?;

    store
        .merge_receptionist_service(
            &client_id,
            &json!({
                "phoneNumber": number.get("number").cloned().unwrap_or(Value::Null),
                "phoneNumberId": number.get("id").cloned().unwrap_or(Value::Null)
            }),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "phoneNumber": {
            "number": number.get("number").cloned().unwrap_or(Value::Null),
            "id": number.get("id").cloned().unwrap_or(Value::Null)
        }
    })))
}
