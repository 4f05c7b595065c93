use serde::{Deserialize, Serialize};

/// `{success, data, message}` wrapper used by most backend endpoints and by
/// every JSON response of this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The payload of a successful envelope, or the backend's message.
    pub fn into_data(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(self
                .message
                .unwrap_or_else(|| "response carried no data".to_string())),
            (false, _) => Err(self.message.unwrap_or_else(|| "request failed".to_string())),
        }
    }
}

/// List endpoints answer either with a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Enveloped(Envelope<Vec<T>>),
}

impl<T> ListBody<T> {
    pub fn into_vec(self) -> Result<Vec<T>, String> {
        match self {
            ListBody::Bare(items) => Ok(items),
            ListBody::Enveloped(env) => env.into_data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_is_accepted() {
        let body: ListBody<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(body.into_vec().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn successful_envelope_yields_data() {
        let body: ListBody<u32> = serde_json::from_str(r#"{"success": true, "data": [7]}"#).unwrap();
        assert_eq!(body.into_vec().unwrap(), vec![7]);
    }

    #[test]
    fn failure_envelope_yields_message() {
        let body: ListBody<u32> =
            serde_json::from_str(r#"{"success": false, "message": "Gagal mengambil data"}"#).unwrap();
        assert_eq!(body.into_vec().unwrap_err(), "Gagal mengambil data");
    }

    #[test]
    fn success_without_data_is_an_error() {
        let env: Envelope<String> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.into_data().is_err());
    }

    #[test]
    fn ok_envelope_omits_missing_message() {
        let value = serde_json::to_value(Envelope::ok(5)).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": 5}));
    }
}
