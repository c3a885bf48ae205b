use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Campaign, Client, Lead};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

// ============ Lead notifications (email + SMS) ============

/// Sends new-lead notifications to the client (email via a
/// SendGrid-compatible API, SMS via a Twilio-compatible API).
///
/// Both channels degrade to a log line when their credentials are not
/// configured, so a bare deployment still shows what would have been sent.
pub struct NotificationService {
    client: HttpClient,
    sendgrid_base_url: String,
    sendgrid_api_key: Option<String>,
    from_email: String,
    twilio_base_url: String,
    twilio_account_sid: Option<String>,
    twilio_auth_token: Option<String>,
    twilio_from_number: Option<String>,
    public_base_url: String,
}

impl NotificationService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HttpClient::new(),
            sendgrid_base_url: config.sendgrid_base_url.clone(),
            sendgrid_api_key: config.sendgrid_api_key.clone(),
            from_email: config.notify_from_email.clone(),
            twilio_base_url: config.twilio_base_url.clone(),
            twilio_account_sid: config.twilio_account_sid.clone(),
            twilio_auth_token: config.twilio_auth_token.clone(),
            twilio_from_number: config.twilio_from_number.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Notify the owning client about a freshly captured lead.
    pub async fn send_lead_notification(
        &self,
        campaign: &Campaign,
        client: Option<&Client>,
        lead: &Lead,
    ) -> Result<(), AppError> {
        self.send_email_notification(campaign, client, lead).await?;
        self.send_sms_notification(client, lead).await?;
        Ok(())
    }

    async fn send_email_notification(
        &self,
        campaign: &Campaign,
        client: Option<&Client>,
        lead: &Lead,
    ) -> Result<(), AppError> {
        let to_email = client
            .map(|c| c.contact_email.clone())
            .filter(|e| !e.is_empty())
            .or_else(|| client.map(|c| c.email.clone()));

        let subject = format!("New Lead: {}", lead.name);
        let body = format!(
            "New lead captured from campaign: {}\n\n\
             Name: {}\nEmail: {}\nPhone: {}\nCompany: {}\nSource: {}\nLead Score: {}\n\n\
             View lead: {}/client/leads",
            campaign.name,
            lead.name,
            lead.email,
            lead.phone,
            lead.company,
            lead.source,
            lead.score,
            self.public_base_url
        );

        let (Some(api_key), Some(to)) = (self.sendgrid_api_key.as_ref(), to_email) else {
            tracing::info!(
                "Email notification skipped (not configured): subject='{}'",
                subject
            );
            return Ok(());
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }]
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.sendgrid_base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Email send failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Email API returned status {}: {}",
                status, error_text
            )));
        }

        tracing::info!("Email notification sent for lead {}", lead.id);
        Ok(())
    }

    async fn send_sms_notification(
        &self,
        client: Option<&Client>,
        lead: &Lead,
    ) -> Result<(), AppError> {
        let to_number = client
            .map(|c| c.contact_phone.clone())
            .filter(|p| !p.is_empty())
            .or_else(|| client.map(|c| c.phone.clone()))
            .filter(|p| !p.is_empty());

        let body = format!(
            "New lead: {} ({}) - View in dashboard",
            lead.name, lead.email
        );

        let (Some(sid), Some(token), Some(from), Some(to)) = (
            self.twilio_account_sid.as_ref(),
            self.twilio_auth_token.as_ref(),
            self.twilio_from_number.as_ref(),
            to_number,
        ) else {
            tracing::info!("SMS notification skipped (not configured): {}", body);
            return Ok(());
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.twilio_base_url, sid
        );

        let response = self
            .client
            .post(url)
            .basic_auth(sid, Some(token))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", &body)])
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("SMS send failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApiError(format!(
                "SMS API returned status {}",
                status
            )));
        }

        tracing::info!("SMS notification sent for lead {}", lead.id);
        Ok(())
    }

    /// Auto-responder email to the lead, when the campaign has one enabled.
    /// Template placeholders {{name}}/{{email}}/{{phone}}/{{company}} are
    /// substituted from the lead record.
    pub async fn send_welcome_email_to_lead(
        &self,
        campaign: &Campaign,
        lead: &Lead,
    ) -> Result<(), AppError> {
        let auto_responder = &campaign.auto_responder;
        let enabled = auto_responder
            .get("enabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !enabled || lead.email.is_empty() {
            return Ok(());
        }

        let subject = auto_responder
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let body = auto_responder
            .get("body")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .replace("{{name}}", &lead.name)
            .replace("{{email}}", &lead.email)
            .replace("{{phone}}", &lead.phone)
            .replace("{{company}}", &lead.company);

        let Some(api_key) = self.sendgrid_api_key.as_ref() else {
            tracing::info!(
                "Welcome email skipped (not configured): to={}, subject='{}'",
                lead.email,
                subject
            );
            return Ok(());
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": lead.email }] }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }]
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.sendgrid_base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Welcome email failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Email API returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

// ============ Spreadsheet export ============

/// Appends captured leads to the client's spreadsheet through a
/// per-deployment export webhook. Disabled (log-only) when unset.
pub struct SheetsService {
    client: HttpClient,
    export_url: Option<String>,
}

impl SheetsService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HttpClient::new(),
            export_url: config.sheets_export_url.clone(),
        }
    }

    /// Row format: timestamp, name, email, phone, company, source, status, score.
    pub async fn append_lead(&self, client_id: &str, lead: &Lead) -> Result<(), AppError> {
        let Some(url) = self.export_url.as_ref() else {
            tracing::info!(
                "Spreadsheet export skipped (not configured): lead {} for client {}",
                lead.id,
                client_id
            );
            return Ok(());
        };

        let payload = json!({
            "clientId": client_id,
            "sheet": "Leads",
            "row": [
                lead.created_at.to_rfc3339(),
                lead.name,
                lead.email,
                lead.phone,
                lead.company,
                lead.source,
                lead.status,
                lead.score.to_string()
            ]
        });

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Sheets export failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Sheets export returned status {}",
                response.status()
            )));
        }

        tracing::info!("Lead {} exported to spreadsheet", lead.id);
        Ok(())
    }
}

// ============ Voice platform (assistant provisioning) ============

/// Client for the voice platform's management API: assistant creation and
/// phone number inventory. Requires VOICE_API_TOKEN.
pub struct VoicePlatformService {
    client: HttpClient,
    base_url: String,
    api_token: Option<String>,
    public_base_url: String,
    webhook_secret: Option<String>,
}

impl VoicePlatformService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: config.voice_api_base_url.clone(),
            api_token: config.voice_api_token.clone(),
            public_base_url: config.public_base_url.clone(),
            webhook_secret: config.voice_webhook_secret.clone(),
        }
    }

    fn token(&self) -> Result<&str, AppError> {
        self.api_token.as_deref().ok_or_else(|| {
            AppError::ExternalApiError("VOICE_API_TOKEN not configured".to_string())
        })
    }

    /// Create a receptionist assistant for a client. The webhook callback is
    /// pointed at this service so call events land in `/api/webhook`.
    pub async fn create_assistant(
        &self,
        client_record: &Client,
        config: &Value,
    ) -> Result<Value, AppError> {
        let token = self.token()?;

        let system_prompt = build_system_prompt(client_record, config);
        let booking_enabled = config
            .get("bookingEnabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let quote_enabled = config
            .get("quoteEnabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut functions = Vec::new();
        if booking_enabled {
            functions.push(json!({
                "name": "check_availability",
                "description": "Check available appointment slots",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "date": { "type": "string", "description": "Date to check (YYYY-MM-DD)" },
                        "service": { "type": "string", "description": "Service type needed" }
                    },
                    "required": ["date"]
                }
            }));
            functions.push(json!({
                "name": "book_appointment",
                "description": "Book an appointment",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "date": { "type": "string", "description": "Appointment date (YYYY-MM-DD)" },
                        "time": { "type": "string", "description": "Appointment time (e.g., \"10:00 AM\")" },
                        "name": { "type": "string", "description": "Customer name" },
                        "email": { "type": "string", "description": "Customer email" },
                        "phone": { "type": "string", "description": "Customer phone number" },
                        "service": { "type": "string", "description": "Service requested" }
                    },
                    "required": ["date", "time", "name"]
                }
            }));
        }
        if quote_enabled {
            functions.push(json!({
                "name": "generate_quote",
                "description": "Generate a price quote",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "service": { "type": "string", "description": "Service type" },
                        "quantity": { "type": "number", "description": "Quantity or scope" }
                    },
                    "required": ["service"]
                }
            }));
        }

        let mut model = json!({
            "provider": "openai",
            "model": "gpt-4-turbo",
            "temperature": 0.7,
            "systemPrompt": system_prompt
        });
        if !functions.is_empty() {
            model["functions"] = json!(functions);
        }

        let assistant_data = json!({
            "name": format!("{} - AI Receptionist", client_record.business_name),
            "model": model,
            "voice": {
                "provider": config.get("voiceProvider").and_then(|v| v.as_str()).unwrap_or("openai"),
                "voiceId": config.get("voiceId").and_then(|v| v.as_str()).unwrap_or("alloy")
            },
            "firstMessage": config
                .get("greetingMessage")
                .and_then(|v| v.as_str())
                .unwrap_or("Hello! Thank you for calling. How can I help you today?"),
            "serverUrl": format!("{}/api/webhook", self.public_base_url),
            "serverUrlSecret": self.webhook_secret,
            "recordingEnabled": true,
            "serverMessages": ["end-of-call-report", "status-update", "hang", "function-call"],
            "silenceTimeoutSeconds": 30,
            "maxDurationSeconds": 1800,
            "analysisPlan": {
                "summaryPrompt": "Provide a concise summary of this call, highlighting key points discussed, any actions taken, and follow-up items.",
                "structuredDataPrompt": "Extract the caller information and lead details from this conversation.",
                "structuredDataSchema": structured_data_schema()
            }
        });

        let response = self
            .client
            .post(format!("{}/assistant", self.base_url))
            .bearer_auth(token)
            .json(&assistant_data)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Assistant create failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Voice platform returned status {}: {}",
                status, error_text
            )));
        }

        let assistant: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse assistant response: {}", e))
        })?;

        Ok(assistant)
    }

    pub async fn purchase_phone_number(
        &self,
        assistant_id: &str,
        area_code: Option<&str>,
    ) -> Result<Value, AppError> {
        let token = self.token()?;

        let mut body = json!({
            "assistantId": assistant_id,
            "name": format!("Phone for {}", assistant_id)
        });
        if let Some(area_code) = area_code {
            body["areaCode"] = json!(area_code);
        }

        let response = self
            .client
            .post(format!("{}/phone-number/buy", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Phone purchase failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Voice platform returned status {}: {}",
                status, error_text
            )));
        }

        let number: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse phone response: {}", e))
        })?;

        Ok(number)
    }

    pub async fn list_available_phone_numbers(
        &self,
        area_code: Option<&str>,
    ) -> Result<Value, AppError> {
        let token = self.token()?;

        let mut request = self
            .client
            .get(format!("{}/phone-number/available", self.base_url))
            .bearer_auth(token);
        if let Some(area_code) = area_code {
            request = request.query(&[("areaCode", area_code)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Phone list failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Voice platform returned status {}",
                response.status()
            )));
        }

        let numbers: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse phone list: {}", e))
        })?;

        Ok(numbers)
    }
}

/// Schema handed to the platform's analysis step; field names must line up
/// with `StructuredData` in webhook_models.
fn structured_data_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "The caller's full name" },
            "email": { "type": "string", "description": "The caller's email address" },
            "phone": { "type": "string", "description": "The caller's phone number" },
            "company": { "type": "string", "description": "The caller's company name" },
            "interest": { "type": "string", "description": "What service the caller is interested in" },
            "budget": { "type": "string", "description": "The caller's budget range" },
            "timeline": { "type": "string", "description": "When the caller needs the service" },
            "leadQuality": { "type": "string", "enum": ["hot", "warm", "cold"], "description": "Assessment of lead quality" },
            "notes": { "type": "string", "description": "Any additional important information" }
        }
    })
}

fn build_system_prompt(client_record: &Client, config: &Value) -> String {
    let receptionist_name = config
        .get("receptionistName")
        .and_then(|v| v.as_str())
        .unwrap_or("Sarah");
    let mut prompt = format!(
        "You are {}, the AI receptionist for {}. Answer questions about the \
         business, capture caller contact details, and stay professional and \
         concise.",
        receptionist_name, client_record.business_name
    );

    if let Some(instructions) = config.get("customInstructions").and_then(|v| v.as_str()) {
        if !instructions.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(instructions);
        }
    }

    prompt
}
