use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

// ============ Database Models ============

/// A tenant of the platform: one business the agency manages.
///
/// The `services` blob carries per-product feature flags and configuration
/// (aiReceptionist, bookingAccelerator, leadGen). `status` is a soft business
/// status: active, inactive or suspended.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Application-generated uuid-v4 key.
    pub client_id: String,
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub website: String,
    pub address: String,
    pub contact_title: String,
    pub contact_email: String,
    pub contact_phone: String,
    /// Portal login email (defaults to the business email on creation).
    pub login_email: String,
    /// sha-256 hex digest of the portal password. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub services: Value,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prospective-customer record, captured from a voice call or a web form.
///
/// `status` is an open, client-customizable string set with no enforced
/// transition graph. `score` is an integer in [0, 100].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub client_id: String,
    pub campaign_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub interest: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub lead_quality: String,
    pub notes: String,
    pub status: String,
    pub source: String,
    pub call_id: Option<String>,
    pub score: i32,
    /// Raw form responses for Lead Gen campaign submissions.
    pub form_responses: Option<Value>,
    /// Tracking data kept for compliance (referrer, utm, ip, capturedAt).
    pub tracking: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configured landing page + form used to capture leads publicly.
///
/// Status lifecycle: draft -> active -> paused <-> active -> completed,
/// moved only by explicit admin actions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub campaign_type: String,
    pub status: String,
    pub target_audience: Value,
    pub lead_magnet: Option<Value>,
    pub landing_page: Value,
    pub thank_you_page: Value,
    pub form: Value,
    pub auto_responder: Value,
    /// Embedded counter block: views, submissions, conversions, conversionRate.
    pub stats: Value,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// One transcript document per webhook delivery; partial (streaming)
/// transcripts are updated in place by call id until the end-of-call report
/// finalizes the call.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTranscript {
    pub id: String,
    pub call_id: String,
    pub client_id: String,
    pub phone_number: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    /// Structured data extracted by the voice platform's analysis step.
    pub lead_data: Option<Value>,
    pub duration_ms: i64,
    pub status: String,
    pub is_partial: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking record linked to a call id and/or lead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Date/time strings as supplied by the caller (voice platform or form).
    pub date: String,
    pub time: String,
    pub service: String,
    pub notes: String,
    pub status: String,
    pub call_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-client billing terms and running delivery counters.
///
/// At most one `active` record per client is assumed by query shape;
/// nothing enforces it at write time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub id: String,
    pub client_id: String,
    #[serde(rename = "type")]
    pub billing_type: String,
    pub upfront_fee: f64,
    pub upfront_paid: bool,
    pub per_lead_rate: f64,
    pub leads_delivered: i32,
    pub leads_invoiced: i32,
    pub total_revenue: f64,
    pub last_invoice_date: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============ Request Payloads ============

/// Per-product enable flags supplied when creating a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFlags {
    #[serde(default)]
    pub ai_receptionist: bool,
    #[serde(default)]
    pub booking_accelerator: bool,
    #[serde(default)]
    pub lead_gen: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_title: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub services: ServiceFlags,
    #[serde(default)]
    pub notes: String,
}

/// Partial client update: only provided fields are merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub contact_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub services: Option<Value>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCredentialsRequest {
    pub client_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub client_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub campaign_type: Option<String>,
    pub status: Option<String>,
    pub target_audience: Option<Value>,
    pub lead_magnet: Option<Value>,
    pub landing_page: Option<Value>,
    pub thank_you_page: Option<Value>,
    pub form: Option<Value>,
    pub auto_responder: Option<Value>,
    pub settings: Option<Value>,
}

/// Partial campaign update (PATCH): only provided fields are merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub campaign_type: Option<String>,
    pub status: Option<String>,
    pub target_audience: Option<Value>,
    pub lead_magnet: Option<Value>,
    pub landing_page: Option<Value>,
    pub thank_you_page: Option<Value>,
    pub form: Option<Value>,
    pub auto_responder: Option<Value>,
    pub stats: Option<Value>,
    pub settings: Option<Value>,
}

/// Merge-update for a lead: `leadId` plus any subset of editable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    pub lead_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub interest: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub lead_quality: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadNoteRequest {
    pub lead_id: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBillingRequest {
    #[serde(rename = "type")]
    pub billing_type: Option<String>,
    pub upfront_fee: Option<f64>,
    pub upfront_paid: Option<bool>,
    pub per_lead_rate: Option<f64>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseRequest {
    pub client_id: Option<String>,
    pub knowledge_base: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateReceptionistRequest {
    pub client_id: Option<String>,
    pub config: Option<Value>,
    #[serde(default)]
    pub purchase_phone: bool,
    pub area_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePhoneRequest {
    pub client_id: Option<String>,
    pub area_code: Option<String>,
}

/// Query string carrying the tenant scope for client-portal reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeQuery {
    pub client_id: Option<String>,
}

// ============ Response Models ============

/// Aggregated client-portal dashboard figures, computed from real rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub calls_received: i64,
    pub appointments_booked: i64,
    pub leads_captured: i64,
    pub conversion_rate: String,
    pub avg_call_duration: String,
    pub revenue: String,
}

// ============ Default config blobs ============

/// Default AI receptionist configuration materialized on first read.
pub fn default_receptionist_config(client_id: &str) -> Value {
    json!({
        "clientId": client_id,
        "basicInfo": {
            "businessName": "",
            "receptionistName": "Sarah",
            "timezone": "America/New_York",
            "language": "english",
            "businessHours": {
                "monday": { "open": "09:00", "close": "17:00", "status": "open" },
                "tuesday": { "open": "09:00", "close": "17:00", "status": "open" },
                "wednesday": { "open": "09:00", "close": "17:00", "status": "open" },
                "thursday": { "open": "09:00", "close": "17:00", "status": "open" },
                "friday": { "open": "09:00", "close": "17:00", "status": "open" },
                "saturday": { "open": "09:00", "close": "13:00", "status": "closed" },
                "sunday": { "open": "09:00", "close": "17:00", "status": "closed" }
            }
        },
        "voice": {
            "provider": "vapi",
            "type": "female-professional",
            "accent": "american",
            "personality": "professional",
            "speed": 1,
            "tone": "neutral"
        },
        "knowledgeBase": {
            "services": [],
            "faqs": [],
            "customResponses": {
                "greeting": "",
                "closing": "",
                "afterHours": "",
                "onHold": "",
                "voicemail": ""
            }
        },
        "callRouting": {
            "forwardNumber": "",
            "forwardTimeout": "30",
            "voicemailEnabled": true,
            "duringHoursAction": "ai-only",
            "afterHoursAction": "voicemail",
            "afterHoursNumber": "",
            "emergencyDetection": false,
            "emergencyNumber": "",
            "vipNumbers": "",
            "recordCalls": true,
            "transcribeCalls": true,
            "callWhisper": false
        },
        "appointmentBooking": {
            "enabled": false,
            "provider": "calendly",
            "apiKey": "",
            "appointmentTypes": "",
            "defaultDuration": "30",
            "bufferTime": "0",
            "sendConfirmation": true,
            "sendSMS": false,
            "confirmationTemplate": "",
            "maxPerDay": "",
            "advanceBooking": "30",
            "minimumNotice": "2"
        },
        "quoteGeneration": {
            "enabled": false,
            "strategy": "fixed",
            "basePricing": "",
            "taxRate": "",
            "volumeDiscounts": "",
            "autoApproveLimit": "",
            "requireApproval": false,
            "approvalEmail": "",
            "emailSubject": "",
            "emailTemplate": "",
            "autoSendEmail": true,
            "followUpEnabled": false,
            "followUpSchedule": ""
        },
        "phoneNumber": {
            "number": "",
            "displayOption": "provider",
            "recordCalls": true,
            "transcribe": true,
            "retention": "90",
            "callScreening": false,
            "spamProtection": true,
            "allowInternational": false,
            "musicOnHold": "default"
        },
        "integrations": {
            "crm": "none",
            "crmApiKey": "",
            "autoCreateContacts": false,
            "syncCallHistory": false,
            "webhookUrl": "",
            "webhookSecret": "",
            "slackEnabled": false,
            "slackWebhook": "",
            "notificationEmails": "",
            "emailFrequency": "immediate",
            "includeTranscripts": false,
            "zapierEnabled": false
        }
    })
}

/// Default booking accelerator configuration materialized on first read.
pub fn default_booking_config(client_id: &str, public_base_url: &str) -> Value {
    json!({
        "clientId": client_id,
        "landingPage": {
            "template": "professional",
            "hero": {
                "headline": "Book Your Appointment Today",
                "subheadline": "Schedule a consultation with our expert team",
                "ctaText": "Book Now",
                "backgroundImage": "",
                "showVideo": false,
                "videoUrl": ""
            },
            "benefits": [
                { "id": 1, "icon": "check", "title": "Fast & Easy", "description": "Book in under 2 minutes" },
                { "id": 2, "icon": "calendar", "title": "Flexible Scheduling", "description": "Choose time that works for you" },
                { "id": 3, "icon": "shield", "title": "Secure & Private", "description": "Your data is protected" }
            ],
            "testimonials": [],
            "socialProof": {
                "showTrustBadges": true,
                "showClientLogos": false,
                "clientLogos": []
            },
            "branding": {
                "logo": "",
                "primaryColor": "#1e3a8a",
                "secondaryColor": "#14b8a6",
                "fontFamily": "Inter"
            },
            "seo": { "title": "", "description": "", "ogImage": "" }
        },
        "formFields": [
            { "id": 1, "type": "text", "label": "Full Name", "required": true, "placeholder": "John Doe" },
            { "id": 2, "type": "email", "label": "Email", "required": true, "placeholder": "john@example.com" },
            { "id": 3, "type": "tel", "label": "Phone", "required": true, "placeholder": "+1 (555) 000-0000" }
        ],
        "formSettings": {
            "layout": "single-column",
            "submitButtonText": "Book Appointment",
            "successMessage": "Thank you! We'll be in touch soon.",
            "redirectUrl": "",
            "multiStep": false,
            "showProgressBar": false
        },
        "qualification": {
            "enabled": false,
            "criteria": [],
            "scoringEnabled": false,
            "qualificationThreshold": 50,
            "disqualificationRules": []
        },
        "calendar": {
            "provider": "calendly",
            "apiKey": "",
            "calendarId": "",
            "availability": {
                "bufferTime": 15,
                "maxPerDay": 10,
                "advanceBooking": 30,
                "minimumNotice": 24
            },
            "meetingTypes": []
        },
        "automation": {
            "emailSequences": {
                "confirmation": { "enabled": true, "subject": "Your appointment is confirmed", "body": "" },
                "reminder": { "enabled": true, "timing": "24h", "subject": "Reminder: Your appointment is tomorrow", "body": "" },
                "followUp": { "enabled": false, "timing": "1d", "subject": "Thank you for your time", "body": "" }
            },
            "smsSequences": {
                "confirmation": { "enabled": false, "message": "" },
                "reminder": { "enabled": false, "message": "" }
            },
            "workflows": []
        },
        "leadManagement": {
            "statuses": ["new", "contacted", "qualified", "appointment-set", "converted", "lost"],
            "assignmentRules": { "enabled": false, "roundRobin": false, "assignees": [] },
            "notifications": { "email": [], "slack": "" }
        },
        "publicUrl": format!("{}/book/{}", public_base_url, client_id),
        "analytics": { "enabled": true, "googleAnalytics": "", "facebookPixel": "" }
    })
}

/// Default per-product services blob stored on a freshly created client.
pub fn default_client_services(flags: &ServiceFlags) -> Value {
    json!({
        "aiReceptionist": {
            "enabled": flags.ai_receptionist,
            "phoneNumber": "",
            "assistantId": "",
            "setupComplete": false
        },
        "bookingAccelerator": {
            "enabled": flags.booking_accelerator,
            "landingPageUrl": "",
            "setupComplete": false
        },
        "leadGen": {
            "enabled": flags.lead_gen,
            "campaigns": [],
            "setupComplete": false
        }
    })
}
