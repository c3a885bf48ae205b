use serde::Deserialize;
use serde_json::Value;

/// Public lead-capture submission from a campaign landing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    #[serde(default)]
    pub campaign_id: Option<String>,

    #[serde(default)]
    pub form_data: Option<FormData>,

    /// Tracking data (referrer, utm params) kept verbatim for compliance.
    #[serde(default)]
    pub tracking: Option<Value>,
}

/// Raw form submission keyed by the external form builder's field ids.
///
/// The builder emits numeric field ids ('1', '2', ...) for configured fields
/// and plain names ('name', 'email', ...) for its legacy templates. Numeric
/// keys take precedence when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct FormData(pub Value);

impl FormData {
    fn field(&self, numeric_key: &str, named_key: &str) -> Option<String> {
        let get = |key: &str| {
            self.0
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        get(numeric_key).or_else(|| get(named_key))
    }

    pub fn name(&self) -> String {
        self.field("1", "name")
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn email(&self) -> String {
        self.field("2", "email").unwrap_or_default()
    }

    pub fn phone(&self) -> String {
        self.field("3", "phone").unwrap_or_default()
    }

    pub fn company(&self) -> String {
        self.field("4", "company").unwrap_or_default()
    }

    /// All responses, stored alongside the lead for later display.
    pub fn raw(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(v: Value) -> FormData {
        FormData(v)
    }

    #[test]
    fn numeric_key_wins_over_named_key() {
        let data = form(json!({ "1": "Alice", "name": "Bob" }));
        assert_eq!(data.name(), "Alice");
    }

    #[test]
    fn named_key_used_when_numeric_absent() {
        let data = form(json!({ "name": "Bob", "email": "bob@example.com" }));
        assert_eq!(data.name(), "Bob");
        assert_eq!(data.email(), "bob@example.com");
    }

    #[test]
    fn empty_numeric_value_falls_back_to_named() {
        let data = form(json!({ "2": "", "email": "fallback@example.com" }));
        assert_eq!(data.email(), "fallback@example.com");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let data = form(json!({}));
        assert_eq!(data.name(), "Unknown");
        assert_eq!(data.email(), "");
        assert_eq!(data.phone(), "");
        assert_eq!(data.company(), "");
    }

    #[test]
    fn parses_full_capture_request() {
        let json = r#"
        {
            "campaignId": "camp-1",
            "formData": { "1": "Alice", "2": "alice@example.com", "3": "+15550100" },
            "tracking": { "utm_source": "google" }
        }
        "#;

        let request: CaptureRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.campaign_id.as_deref(), Some("camp-1"));
        let data = request.form_data.unwrap();
        assert_eq!(data.name(), "Alice");
        assert_eq!(data.phone(), "+15550100");
    }
}
