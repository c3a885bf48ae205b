use crate::db_storage::{AppointmentStore, CallStore, LeadStore, NewLead};
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::scoring::{calculate_lead_score, field_to_string, unit_price_for, weekday_name};
use crate::webhook_models::{CallInfo, VoiceWebhookPayload, WebhookMessage};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Voice platform webhook handler.
///
/// Receives call events from the voice platform and dispatches on
/// `message.type`. Response shape is part of the platform contract:
/// report/transcript messages (and anything unrecognized) are acknowledged
/// with `{"success": true}`, while function-call messages return the
/// function's result object as the raw body so the assistant can speak it.
///
/// Authentication: x-voice-secret header must match VOICE_WEBHOOK_SECRET
/// when configured; validation is skipped otherwise.
pub async fn voice_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<VoiceWebhookPayload>,
) -> Result<Response, AppError> {
    validate_webhook_secret(&state, &headers)?;

    let message_type = payload.message.message_type.clone();
    tracing::info!("Received voice webhook: {}", message_type);

    match message_type.as_str() {
        "end-of-call-report" => {
            // Failures are swallowed: the platform delivers at-least-once and
            // retries on non-2xx, which would duplicate transcripts.
            if let Err(e) = handle_end_of_call_report(&state, &payload.message).await {
                tracing::error!("Error handling end of call report: {}", e);
            }
        }
        "function-call" => {
            let result = handle_function_call(&state, &payload.message).await;
            return Ok(Json(result).into_response());
        }
        "transcript" => {
            handle_transcript(&state, &payload.message).await?;
        }
        other => {
            tracing::info!("Unhandled message type: {}", other);
        }
    }

    Ok(Json(json!({ "success": true })).into_response())
}

/// Validate the shared webhook secret from the x-voice-secret header.
fn validate_webhook_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    // If no secret is configured, skip validation (warn was already logged at startup)
    let Some(ref expected_secret) = state.config.voice_webhook_secret else {
        return Ok(());
    };

    let token = headers
        .get("x-voice-secret")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing x-voice-secret header".to_string()))?;

    // Constant-time comparison to prevent timing attacks
    if !constant_time_compare(token, expected_secret) {
        tracing::warn!("Invalid voice webhook secret received");
        return Err(AppError::Unauthorized("Invalid webhook secret".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (basic implementation)
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// End-of-call report: always persist the final transcript; derive a lead
/// when the structured data carries contact info.
async fn handle_end_of_call_report(
    state: &AppState,
    message: &WebhookMessage,
) -> Result<(), AppError> {
    let call = message.call.clone().unwrap_or_default();
    let analysis = message.analysis.clone().unwrap_or_default();
    let artifact = message.artifact.clone().unwrap_or_default();

    let call_id = call.id.clone().unwrap_or_default();
    let client_id = call.client_id();

    let lead_data = analysis
        .structured_data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Failed to serialize lead data: {}", e)))?;

    let call_store = CallStore::new(state.db.clone());
    call_store
        .insert_final(
            &call_id,
            &client_id,
            call.customer_number().as_deref(),
            artifact.transcript.as_deref(),
            analysis.summary.as_deref(),
            lead_data.as_ref(),
            call.duration_ms(),
            call.status.as_deref(),
        )
        .await?;

    let structured = analysis.structured_data.clone().unwrap_or_default();
    if structured.has_contact_info() {
        let score = calculate_lead_score(&structured);
        let lead_store = LeadStore::new(state.db.clone());
        lead_store
            .insert(NewLead {
                client_id: client_id.clone(),
                name: field_to_string(&structured.name).unwrap_or_default(),
                email: field_to_string(&structured.email).unwrap_or_default(),
                phone: field_to_string(&structured.phone)
                    .or_else(|| call.customer_number())
                    .unwrap_or_default(),
                company: field_to_string(&structured.company).unwrap_or_default(),
                interest: field_to_string(&structured.interest),
                budget: field_to_string(&structured.budget),
                timeline: field_to_string(&structured.timeline),
                lead_quality: field_to_string(&structured.lead_quality),
                notes: field_to_string(&structured.notes)
                    .or_else(|| analysis.summary.clone())
                    .unwrap_or_default(),
                call_id: Some(call_id.clone()),
                source: Some("ai-receptionist".to_string()),
                score: Some(score),
                ..Default::default()
            })
            .await?;
    }

    tracing::info!("Saved call {} and lead data", call_id);
    Ok(())
}

/// Synchronous function dispatch; the returned object is the HTTP body.
async fn handle_function_call(state: &AppState, message: &WebhookMessage) -> Value {
    let function_call = message.function_call.clone().unwrap_or_default();
    let function_name = function_call.name.unwrap_or_default();
    let parameters = function_call.parameters.unwrap_or_else(|| json!({}));

    tracing::info!("Function call: {} {}", function_name, parameters);

    match function_name.as_str() {
        "check_availability" => check_availability(&parameters),
        "book_appointment" => book_appointment(state, &parameters, message.call.as_ref()).await,
        "generate_quote" => generate_quote(&parameters),
        other => json!({ "error": format!("Unknown function: {}", other) }),
    }
}

/// Fixed slot table; real calendar lookup is a downstream integration.
pub fn check_availability(params: &Value) -> Value {
    let date = params.get("date").and_then(|v| v.as_str()).unwrap_or("");
    let day_name = weekday_name(date)
        .map(|d| d.to_string())
        .unwrap_or_else(|| date.to_string());

    json!({
        "available": true,
        "message": format!("We have availability on {}", day_name),
        "slots": [
            { "time": "9:00 AM", "available": true },
            { "time": "10:00 AM", "available": true },
            { "time": "11:00 AM", "available": false },
            { "time": "2:00 PM", "available": true },
            { "time": "3:00 PM", "available": true },
            { "time": "4:00 PM", "available": true }
        ]
    })
}

/// Book an appointment against the call's client. Persistence failures are
/// answered with a caller-facing handoff message, not an error status.
async fn book_appointment(state: &AppState, params: &Value, call: Option<&CallInfo>) -> Value {
    let default_call = CallInfo::default();
    let call = call.unwrap_or(&default_call);
    let client_id = call.client_id();

    let get = |key: &str| params.get(key).and_then(|v| v.as_str()).unwrap_or("");
    let name = get("name");
    let email = get("email");
    let date = get("date");
    let time = get("time");
    let phone = params
        .get("phone")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| call.customer_number())
        .unwrap_or_default();
    let service = params
        .get("service")
        .and_then(|v| v.as_str())
        .unwrap_or("General Consultation");

    let store = AppointmentStore::new(state.db.clone());
    match store
        .create(
            &client_id,
            name,
            email,
            &phone,
            date,
            time,
            service,
            call.id.as_deref(),
        )
        .await
    {
        Ok(appointment) => json!({
            "success": true,
            "message": format!("Appointment booked for {} on {} at {}", name, date, time),
            "appointment": appointment
        }),
        Err(e) => {
            tracing::error!("Failed to book appointment: {}", e);
            json!({
                "success": false,
                "message": "Sorry, there was an error booking your appointment. Let me transfer you to a team member."
            })
        }
    }
}

/// Fixed-tier quote; nothing is persisted.
pub fn generate_quote(params: &Value) -> Value {
    let service = params.get("service").and_then(|v| v.as_str());
    let rate = unit_price_for(service);
    let quantity = params
        .get("quantity")
        .and_then(|v| v.as_i64())
        .unwrap_or(1);
    let total = rate * quantity;

    json!({
        "success": true,
        "quote": {
            "service": params.get("service").cloned().unwrap_or(Value::Null),
            "quantity": quantity,
            "unitPrice": rate,
            "total": total,
            "validFor": "30 days"
        },
        "message": format!(
            "Based on your requirements, the quote is ${}. This quote is valid for 30 days.",
            total
        )
    })
}

/// Partial transcript upsert keyed by call id; no scoring, no lead.
async fn handle_transcript(state: &AppState, message: &WebhookMessage) -> Result<(), AppError> {
    let call = message.call.clone().unwrap_or_default();

    // The platform has shipped both {text: ...} objects and bare strings here.
    let text = message.transcript.as_ref().and_then(|t| {
        t.get("text")
            .and_then(|v| v.as_str())
            .or_else(|| t.as_str())
            .map(str::to_string)
    });

    if let (Some(call_id), Some(text)) = (call.id.clone(), text) {
        let client_id = call.client_id();
        let store = CallStore::new(state.db.clone());
        store.upsert_partial(&call_id, &client_id, &text).await?;
    }

    Ok(())
}
