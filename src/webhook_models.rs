use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound envelope from the voice platform.
///
/// Every delivery wraps a single `message` whose `type` discriminates the
/// event: end-of-call-report, function-call, transcript (partial), or other
/// server messages we ignore.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceWebhookPayload {
    pub message: WebhookMessage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookMessage {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub message_type: String,

    /// Call context (id, metadata, customer number, lifecycle timestamps).
    #[serde(default)]
    pub call: Option<CallInfo>,

    /// Post-call analysis (summary + structured data), end-of-call only.
    #[serde(default)]
    pub analysis: Option<CallAnalysis>,

    /// Call artifacts (full transcript text), end-of-call only.
    #[serde(default)]
    pub artifact: Option<CallArtifact>,

    /// Synchronous function invocation, function-call messages only.
    #[serde(rename = "functionCall", default)]
    pub function_call: Option<FunctionCall>,

    /// Streaming transcript chunk; kept loose because the platform has
    /// shipped both `{text: ...}` objects and bare values here.
    #[serde(default)]
    pub transcript: Option<Value>,

    /// Raw data for any additional fields
    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallInfo {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub metadata: Option<CallMetadata>,

    #[serde(default)]
    pub customer: Option<CallCustomer>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(rename = "startedAt", default)]
    pub started_at: Option<String>,

    #[serde(rename = "endedAt", default)]
    pub ended_at: Option<String>,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,

    /// Raw call data
    #[serde(flatten)]
    pub raw: Value,
}

impl CallInfo {
    /// Tenant id set on the outbound call; sentinel "unknown" when absent.
    pub fn client_id(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.client_id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Caller phone number, when the platform supplied one.
    pub fn customer_number(&self) -> Option<String> {
        self.customer.as_ref().and_then(|c| c.number.clone())
    }

    /// Call duration in milliseconds (endedAt - startedAt), 0 when either
    /// timestamp is missing or unparseable.
    pub fn duration_ms(&self) -> i64 {
        let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).ok();
        match (self.started_at.as_deref(), self.ended_at.as_deref()) {
            (Some(start), Some(end)) => match (parse(start), parse(end)) {
                (Some(start), Some(end)) => (end - start).num_milliseconds().max(0),
                _ => 0,
            },
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallMetadata {
    #[serde(rename = "clientId", default)]
    pub client_id: Option<String>,

    /// Raw metadata
    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallCustomer {
    #[serde(default)]
    pub number: Option<String>,

    /// Raw customer data
    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallAnalysis {
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(rename = "structuredData", default)]
    pub structured_data: Option<StructuredData>,

    /// Raw analysis data
    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallArtifact {
    #[serde(default)]
    pub transcript: Option<String>,

    /// Raw artifact data
    #[serde(flatten)]
    pub raw: Value,
}

/// Fields extracted by the voice platform's analysis step from a call.
///
/// Values are kept as raw JSON: the extraction model emits strings for most
/// fields but numbers do occur (budget, timeline), and scoring only cares
/// about presence.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StructuredData {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub company: Option<Value>,
    #[serde(default)]
    pub interest: Option<Value>,
    #[serde(default)]
    pub budget: Option<Value>,
    #[serde(default)]
    pub timeline: Option<Value>,
    #[serde(rename = "leadQuality", default)]
    pub lead_quality: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,

    /// Raw structured data for any additional fields
    #[serde(flatten)]
    pub raw: Value,
}

impl StructuredData {
    /// A lead is derivable when any of name/email/phone is present.
    pub fn has_contact_info(&self) -> bool {
        crate::scoring::is_truthy(&self.name)
            || crate::scoring::is_truthy(&self.email)
            || crate::scoring::is_truthy(&self.phone)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub parameters: Option<Value>,

    /// Raw function-call data
    #[serde(flatten)]
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_end_of_call_report() {
        let json = r#"
        {
            "message": {
                "type": "end-of-call-report",
                "call": {
                    "id": "call-123",
                    "metadata": { "clientId": "client-1" },
                    "customer": { "number": "+15550100" },
                    "startedAt": "2025-06-01T10:00:00Z",
                    "endedAt": "2025-06-01T10:03:30Z",
                    "status": "ended"
                },
                "analysis": {
                    "summary": "Caller asked about pricing",
                    "structuredData": {
                        "name": "Jane Doe",
                        "email": "jane@example.com",
                        "budget": 5000,
                        "leadQuality": "hot"
                    }
                },
                "artifact": { "transcript": "AI: Hello..." }
            }
        }
        "#;

        let payload: VoiceWebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.message.message_type, "end-of-call-report");

        let call = payload.message.call.unwrap();
        assert_eq!(call.client_id(), "client-1");
        assert_eq!(call.customer_number(), Some("+15550100".to_string()));
        assert_eq!(call.duration_ms(), 210_000);

        let structured = payload
            .message
            .analysis
            .unwrap()
            .structured_data
            .unwrap();
        assert!(structured.has_contact_info());
        assert_eq!(structured.budget, Some(json!(5000)));
    }

    #[test]
    fn test_parse_function_call() {
        let json = r#"
        {
            "message": {
                "type": "function-call",
                "call": { "id": "call-9" },
                "functionCall": {
                    "name": "generate_quote",
                    "parameters": { "service": "premium", "quantity": 3 }
                }
            }
        }
        "#;

        let payload: VoiceWebhookPayload = serde_json::from_str(json).unwrap();
        let fc = payload.message.function_call.unwrap();
        assert_eq!(fc.name.as_deref(), Some("generate_quote"));
        assert_eq!(fc.parameters.unwrap()["quantity"], json!(3));
    }

    #[test]
    fn test_missing_metadata_defaults_to_unknown() {
        let call: CallInfo = serde_json::from_value(json!({ "id": "c1" })).unwrap();
        assert_eq!(call.client_id(), "unknown");
        assert_eq!(call.duration_ms(), 0);
    }

    #[test]
    fn test_company_only_structured_data_has_no_contact() {
        let structured: StructuredData =
            serde_json::from_value(json!({ "company": "Acme" })).unwrap();
        assert!(!structured.has_contact_info());
    }
}
