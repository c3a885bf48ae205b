use serde::Deserialize;

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Admin dashboard credentials (single operator account).
    pub admin_email: String,
    pub admin_password: String,
    /// Shared secret expected in the x-voice-secret header of inbound
    /// voice-platform webhooks. Validation is skipped when unset.
    pub voice_webhook_secret: Option<String>,
    /// Voice platform API (assistant provisioning, phone numbers).
    pub voice_api_base_url: String,
    pub voice_api_token: Option<String>,
    /// Email notifications (SendGrid-compatible API).
    pub sendgrid_base_url: String,
    pub sendgrid_api_key: Option<String>,
    pub notify_from_email: String,
    /// SMS notifications (Twilio-compatible API).
    pub twilio_base_url: String,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    /// Spreadsheet export sink (per-deployment webhook URL). Unset disables export.
    pub sheets_export_url: Option<String>,
    /// Base URL used when building public landing-page links.
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_email: std::env::var("ADMIN_EMAIL")
                .map_err(|_| anyhow::anyhow!("ADMIN_EMAIL environment variable required"))
                .and_then(|email| {
                    if email.trim().is_empty() {
                        anyhow::bail!("ADMIN_EMAIL cannot be empty");
                    }
                    Ok(email)
                })?,
            admin_password: std::env::var("ADMIN_PASSWORD")
                .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD environment variable required"))
                .and_then(|pass| {
                    if pass.trim().is_empty() {
                        anyhow::bail!("ADMIN_PASSWORD cannot be empty");
                    }
                    Ok(pass)
                })?,
            voice_webhook_secret: optional_env("VOICE_WEBHOOK_SECRET"),
            voice_api_base_url: std::env::var("VOICE_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.vapi.ai".to_string()),
            voice_api_token: optional_env("VOICE_API_TOKEN"),
            sendgrid_base_url: std::env::var("SENDGRID_BASE_URL")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            sendgrid_api_key: optional_env("SENDGRID_API_KEY"),
            notify_from_email: std::env::var("NOTIFY_FROM_EMAIL")
                .unwrap_or_else(|_| "leads@arisolutionsinc.com".to_string()),
            twilio_base_url: std::env::var("TWILIO_BASE_URL")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            twilio_account_sid: optional_env("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: optional_env("TWILIO_AUTH_TOKEN"),
            twilio_from_number: optional_env("TWILIO_FROM_NUMBER"),
            sheets_export_url: optional_env("SHEETS_EXPORT_URL"),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Server Port: {}", config.port);
        if config.voice_webhook_secret.is_none() {
            tracing::warn!("VOICE_WEBHOOK_SECRET not set - webhook signature validation disabled");
        }
        if config.voice_api_token.is_none() {
            tracing::warn!("VOICE_API_TOKEN not set - assistant provisioning disabled");
        }
        if config.sendgrid_api_key.is_none() {
            tracing::info!("SENDGRID_API_KEY not set - email notifications will be logged only");
        }
        if config.sheets_export_url.is_none() {
            tracing::info!("SHEETS_EXPORT_URL not set - spreadsheet export disabled");
        }

        Ok(config)
    }
}
