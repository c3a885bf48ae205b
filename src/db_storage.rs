use crate::errors::AppError;
use crate::models::*;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Application-generated document key; the storage engine's own ids are
/// never exposed.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Clients ============

pub struct ClientStore {
    pool: PgPool,
}

impl ClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new client with the default per-product services blob.
    /// The portal login defaults to the business email.
    pub async fn create(
        &self,
        req: &CreateClientRequest,
        password_hash: &str,
    ) -> Result<Client, AppError> {
        let client_id = new_id();
        let services = default_client_services(&req.services);

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                client_id, business_name, contact_name, email, phone, industry,
                website, address, contact_title, contact_email, contact_phone,
                login_email, password_hash, services, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&client_id)
        .bind(&req.business_name)
        .bind(&req.contact_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.industry)
        .bind(&req.website)
        .bind(&req.address)
        .bind(&req.contact_title)
        .bind(&req.contact_email)
        .bind(&req.contact_phone)
        .bind(&req.email)
        .bind(password_hash)
        .bind(&services)
        .bind(&req.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get(&self, client_id: &str) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients =
            sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(clients)
    }

    /// Shallow merge of the provided fields; absent fields keep their value.
    pub async fn update(
        &self,
        client_id: &str,
        req: &UpdateClientRequest,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET business_name = COALESCE($2, business_name),
                contact_name = COALESCE($3, contact_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                industry = COALESCE($6, industry),
                website = COALESCE($7, website),
                address = COALESCE($8, address),
                contact_title = COALESCE($9, contact_title),
                contact_email = COALESCE($10, contact_email),
                contact_phone = COALESCE($11, contact_phone),
                services = COALESCE($12, services),
                status = COALESCE($13, status),
                notes = COALESCE($14, notes),
                updated_at = now()
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .bind(&req.business_name)
        .bind(&req.contact_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.industry)
        .bind(&req.website)
        .bind(&req.address)
        .bind(&req.contact_title)
        .bind(&req.contact_email)
        .bind(&req.contact_phone)
        .bind(&req.services)
        .bind(&req.status)
        .bind(&req.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, client_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_login(&self, email: &str) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE login_email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    /// Rotate the portal credentials; the login email is only changed when
    /// one is provided.
    pub async fn set_portal_credentials(
        &self,
        client_id: &str,
        login_email: Option<&str>,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET login_email = COALESCE($2, login_email),
                password_hash = $3,
                updated_at = now()
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .bind(login_email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Shallow-merge a patch into the aiReceptionist branch of the services
    /// blob (assistant id, phone number, setup flags).
    pub async fn merge_receptionist_service(
        &self,
        client_id: &str,
        patch: &Value,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET services = jsonb_set(
                    services,
                    '{aiReceptionist}',
                    COALESCE(services->'aiReceptionist', '{}'::jsonb) || $2::jsonb,
                    true
                ),
                updated_at = now()
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .bind(patch)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============ Leads ============

/// Insert payload for a lead; optional fields fall back to the collection
/// defaults (quality warm, status new, source ai-receptionist, score 70).
#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub client_id: String,
    pub campaign_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub interest: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub lead_quality: Option<String>,
    pub notes: String,
    pub status: Option<String>,
    pub source: Option<String>,
    pub call_id: Option<String>,
    pub score: Option<i32>,
    pub form_responses: Option<Value>,
    pub tracking: Option<Value>,
}

pub struct LeadStore {
    pool: PgPool,
}

impl LeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        let id = new_id();

        let row = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                id, client_id, campaign_id, name, email, phone, company,
                interest, budget, timeline, lead_quality, notes, status,
                source, call_id, score, form_responses, tracking
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                COALESCE($11, 'warm'), $12,
                COALESCE($13, 'new'), COALESCE($14, 'ai-receptionist'),
                $15, COALESCE($16, 70), $17, $18
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&lead.client_id)
        .bind(&lead.campaign_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.interest)
        .bind(&lead.budget)
        .bind(&lead.timeline)
        .bind(&lead.lead_quality)
        .bind(&lead.notes)
        .bind(&lead.status)
        .bind(&lead.source)
        .bind(&lead.call_id)
        .bind(lead.score)
        .bind(&lead.form_responses)
        .bind(&lead.tracking)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn list(&self, client_id: Option<&str>) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE ($1::text IS NULL OR client_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn update(&self, id: &str, req: &UpdateLeadRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                company = COALESCE($5, company),
                interest = COALESCE($6, interest),
                budget = COALESCE($7, budget),
                timeline = COALESCE($8, timeline),
                lead_quality = COALESCE($9, lead_quality),
                notes = COALESCE($10, notes),
                status = COALESCE($11, status),
                score = COALESCE($12, score),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.company)
        .bind(&req.interest)
        .bind(&req.budget)
        .bind(&req.timeline)
        .bind(&req.lead_quality)
        .bind(&req.notes)
        .bind(&req.status)
        .bind(req.score)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Notes accumulate as newline-separated entries.
    pub async fn append_note(&self, id: &str, note: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET notes = CASE WHEN notes = '' THEN $2 ELSE notes || E'\n' || $2 END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(note)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, client_id: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// ============ Campaigns ============

pub struct CampaignStore {
    pool: PgPool,
}

impl CampaignStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateCampaignRequest) -> Result<Campaign, AppError> {
        let id = new_id();
        let form_default = serde_json::json!({
            "fields": [],
            "submitText": "Submit",
            "successMessage": "Thank you for your interest!"
        });
        let auto_responder_default = serde_json::json!({
            "enabled": false,
            "subject": "",
            "body": ""
        });
        let settings_default = serde_json::json!({
            "leadScoring": true,
            "autoQualify": false,
            "assignToSalesRep": null,
            "notifyOnSubmit": true
        });

        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (
                id, client_id, name, description, campaign_type, status,
                target_audience, lead_magnet, landing_page, thank_you_page,
                form, auto_responder, settings
            )
            VALUES (
                $1, $2, $3, $4,
                COALESCE($5, 'lead-capture'), COALESCE($6, 'draft'),
                COALESCE($7, '{}'::jsonb), $8,
                COALESCE($9, '{}'::jsonb), COALESCE($10, '{}'::jsonb),
                COALESCE($11, $12), COALESCE($13, $14), COALESCE($15, $16)
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.client_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.campaign_type)
        .bind(&req.status)
        .bind(&req.target_audience)
        .bind(&req.lead_magnet)
        .bind(&req.landing_page)
        .bind(&req.thank_you_page)
        .bind(&req.form)
        .bind(&form_default)
        .bind(&req.auto_responder)
        .bind(&auto_responder_default)
        .bind(&req.settings)
        .bind(&settings_default)
        .fetch_one(&self.pool)
        .await?;

        Ok(campaign)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Campaign>, AppError> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(campaign)
    }

    pub async fn list(&self, client_id: Option<&str>) -> Result<Vec<Campaign>, AppError> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT * FROM campaigns
            WHERE ($1::text IS NULL OR client_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    pub async fn update(&self, id: &str, req: &UpdateCampaignRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                campaign_type = COALESCE($4, campaign_type),
                status = COALESCE($5, status),
                target_audience = COALESCE($6, target_audience),
                lead_magnet = COALESCE($7, lead_magnet),
                landing_page = COALESCE($8, landing_page),
                thank_you_page = COALESCE($9, thank_you_page),
                form = COALESCE($10, form),
                auto_responder = COALESCE($11, auto_responder),
                stats = COALESCE($12, stats),
                settings = COALESCE($13, settings),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.campaign_type)
        .bind(&req.status)
        .bind(&req.target_audience)
        .bind(&req.lead_magnet)
        .bind(&req.landing_page)
        .bind(&req.thank_you_page)
        .bind(&req.form)
        .bind(&req.auto_responder)
        .bind(&req.stats)
        .bind(&req.settings)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// draft/paused -> active, stamping published_at.
    pub async fn publish(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'active', published_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn pause(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = 'paused', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bump the embedded stats.submissions counter.
    pub async fn increment_submissions(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET stats = jsonb_set(
                    stats,
                    '{submissions}',
                    to_jsonb(COALESCE((stats->>'submissions')::int, 0) + 1)
                ),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============ Call transcripts ============

pub struct CallStore {
    pool: PgPool,
}

impl CallStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Partial (streaming) transcript upsert keyed by call id: update in
    /// place when any document for the call exists, insert otherwise.
    /// Duplicate or out-of-order deliveries self-heal to the latest write.
    pub async fn upsert_partial(
        &self,
        call_id: &str,
        client_id: &str,
        transcript: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE call_transcripts
            SET transcript = $2, updated_at = now()
            WHERE call_id = $1
            "#,
        )
        .bind(call_id)
        .bind(transcript)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO call_transcripts (id, call_id, client_id, transcript, is_partial, status)
                VALUES ($1, $2, $3, $4, true, 'in-progress')
                "#,
            )
            .bind(new_id())
            .bind(call_id)
            .bind(client_id)
            .bind(transcript)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Final transcript from an end-of-call report. Plain insert with a
    /// fresh id; redelivery of the same report creates a second document.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_final(
        &self,
        call_id: &str,
        client_id: &str,
        phone_number: Option<&str>,
        transcript: Option<&str>,
        summary: Option<&str>,
        lead_data: Option<&Value>,
        duration_ms: i64,
        status: Option<&str>,
    ) -> Result<CallTranscript, AppError> {
        let row = sqlx::query_as::<_, CallTranscript>(
            r#"
            INSERT INTO call_transcripts (
                id, call_id, client_id, phone_number, transcript, summary,
                lead_data, duration_ms, status, is_partial
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'completed'), false)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(call_id)
        .bind(client_id)
        .bind(phone_number)
        .bind(transcript)
        .bind(summary)
        .bind(lead_data)
        .bind(duration_ms)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_by_call(&self, call_id: &str) -> Result<Option<CallTranscript>, AppError> {
        let row = sqlx::query_as::<_, CallTranscript>(
            "SELECT * FROM call_transcripts WHERE call_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn count_for_call(&self, call_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM call_transcripts WHERE call_id = $1",
        )
        .bind(call_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list(&self, client_id: Option<&str>) -> Result<Vec<CallTranscript>, AppError> {
        let rows = sqlx::query_as::<_, CallTranscript>(
            r#"
            SELECT * FROM call_transcripts
            WHERE ($1::text IS NULL OR client_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_completed(&self, client_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM call_transcripts WHERE client_id = $1 AND is_partial = false",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn avg_duration_ms(&self, client_id: &str) -> Result<Option<f64>, AppError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            r#"
            SELECT AVG(duration_ms)::float8 FROM call_transcripts
            WHERE client_id = $1 AND is_partial = false AND duration_ms > 0
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(avg)
    }
}

// ============ Appointments ============

pub struct AppointmentStore {
    pool: PgPool,
}

impl AppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        client_id: &str,
        name: &str,
        email: &str,
        phone: &str,
        date: &str,
        time: &str,
        service: &str,
        call_id: Option<&str>,
    ) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                id, client_id, name, email, phone, date, time, service, call_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(client_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(date)
        .bind(time)
        .bind(service)
        .bind(call_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(&self, client_id: Option<&str>) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE ($1::text IS NULL OR client_id = $1)
            ORDER BY date DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count(&self, client_id: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE client_id = $1")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// ============ Billing ============

pub struct BillingStore {
    pool: PgPool,
}

impl BillingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The client's active record; "one active per client" is assumed by
    /// this query shape, not enforced on write.
    pub async fn get_active(&self, client_id: &str) -> Result<Option<BillingRecord>, AppError> {
        let row = sqlx::query_as::<_, BillingRecord>(
            r#"
            SELECT * FROM billing
            WHERE client_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create(
        &self,
        client_id: &str,
        req: &UpsertBillingRequest,
    ) -> Result<BillingRecord, AppError> {
        let row = sqlx::query_as::<_, BillingRecord>(
            r#"
            INSERT INTO billing (
                id, client_id, billing_type, upfront_fee, upfront_paid,
                per_lead_rate, notes
            )
            VALUES (
                $1, $2, COALESCE($3, 'per-lead'), COALESCE($4, 0),
                COALESCE($5, false), COALESCE($6, 0), COALESCE($7, '')
            )
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(client_id)
        .bind(&req.billing_type)
        .bind(req.upfront_fee)
        .bind(req.upfront_paid)
        .bind(req.per_lead_rate)
        .bind(&req.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update(&self, id: &str, req: &UpsertBillingRequest) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE billing
            SET billing_type = COALESCE($2, billing_type),
                upfront_fee = COALESCE($3, upfront_fee),
                upfront_paid = COALESCE($4, upfront_paid),
                per_lead_rate = COALESCE($5, per_lead_rate),
                status = COALESCE($6, status),
                notes = COALESCE($7, notes),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.billing_type)
        .bind(req.upfront_fee)
        .bind(req.upfront_paid)
        .bind(req.per_lead_rate)
        .bind(&req.status)
        .bind(&req.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Increment the delivered-leads counter on the active record.
    pub async fn track_delivery(&self, client_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE billing
            SET leads_delivered = leads_delivered + 1, updated_at = now()
            WHERE client_id = $1 AND status = 'active'
            "#,
        )
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============ Per-product config blobs ============

pub struct ConfigStore {
    pool: PgPool,
}

impl ConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the stored config blob, materializing `default` on first read.
    pub async fn get_or_init(
        &self,
        table: ConfigTable,
        client_id: &str,
        default: Value,
    ) -> Result<Value, AppError> {
        let select = format!("SELECT config FROM {} WHERE client_id = $1", table.name());
        let existing = sqlx::query_scalar::<_, Value>(&select)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(config) = existing {
            return Ok(config);
        }

        let insert = format!(
            r#"
            INSERT INTO {} (client_id, config)
            VALUES ($1, $2)
            ON CONFLICT (client_id) DO UPDATE SET config = {}.config
            RETURNING config
            "#,
            table.name(),
            table.name()
        );
        let config = sqlx::query_scalar::<_, Value>(&insert)
            .bind(client_id)
            .bind(&default)
            .fetch_one(&self.pool)
            .await?;

        Ok(config)
    }

    /// Whole-blob replace.
    pub async fn put(
        &self,
        table: ConfigTable,
        client_id: &str,
        config: &Value,
    ) -> Result<(), AppError> {
        let upsert = format!(
            r#"
            INSERT INTO {} (client_id, config)
            VALUES ($1, $2)
            ON CONFLICT (client_id)
            DO UPDATE SET config = EXCLUDED.config, updated_at = now()
            "#,
            table.name()
        );
        sqlx::query(&upsert)
            .bind(client_id)
            .bind(config)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// The two per-product config collections.
#[derive(Debug, Clone, Copy)]
pub enum ConfigTable {
    Receptionist,
    Booking,
}

impl ConfigTable {
    fn name(&self) -> &'static str {
        match self {
            ConfigTable::Receptionist => "receptionist_configs",
            ConfigTable::Booking => "booking_configs",
        }
    }
}
