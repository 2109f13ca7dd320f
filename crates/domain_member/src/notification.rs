//! Transactional notifications
//!
//! A transactional notification asks the platform to send one templated
//! email to one address, optionally with dynamic and content key/value
//! pairs. The `dyn` and `content` attributes are omitted from the request
//! entirely when no pairs are given; the notification service rejects
//! requests carrying the attributes empty.

use chrono::{DateTime, Utc};

use core_kernel::remote::{KeyValue, ParamValue, RemoteRequest};

/// A transactional notification send request
#[derive(Debug, Clone)]
pub struct Notification {
    /// Recipient address; also the member lookup key
    pub email: String,
    /// Platform notification (template) identifier
    pub notification_id: i64,
    /// Random token for the send
    pub random: String,
    /// Whether the platform should encrypt
    pub encrypt: bool,
    /// Dynamic personalization pairs
    pub dyn_entries: Vec<KeyValue>,
    /// Content injection pairs
    pub content_entries: Vec<KeyValue>,
}

impl Notification {
    /// Creates a notification with no dynamic or content pairs
    pub fn new(email: impl Into<String>, notification_id: i64, random: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            notification_id,
            random: random.into(),
            encrypt: false,
            dyn_entries: Vec::new(),
            content_entries: Vec::new(),
        }
    }

    /// Adds a dynamic personalization pair
    pub fn with_dyn(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dyn_entries.push(KeyValue::new(key, value));
        self
    }

    /// Adds a content injection pair
    pub fn with_content(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.content_entries.push(KeyValue::new(key, value));
        self
    }

    /// Enables encryption
    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }

    /// Builds the `sendRequest` object with the given send timestamp
    pub fn request_at(&self, send_at: DateTime<Utc>) -> RemoteRequest {
        let mut request = RemoteRequest::new("sendRequest");
        request.set("email", ParamValue::text(self.email.clone()));
        request.set("notificationId", ParamValue::Int(self.notification_id));
        request.set("random", ParamValue::text(self.random.clone()));
        request.set("encrypt", ParamValue::Flag(self.encrypt));
        request.set("synchrotype", ParamValue::text("NOTHING"));
        request.set("uidkey", ParamValue::text("email"));
        request.set("senddate", ParamValue::Timestamp(send_at));

        if !self.dyn_entries.is_empty() {
            request.set("dyn", ParamValue::Entries(self.dyn_entries.clone()));
        }
        if !self.content_entries.is_empty() {
            request.set("content", ParamValue::Entries(self.content_entries.clone()));
        }
        request
    }

    /// Builds the `sendRequest` object timestamped now
    pub fn request(&self) -> RemoteRequest {
        self.request_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dyn_omitted_entirely_when_empty() {
        let request = Notification::new("a@b.com", 77, "tok").request();

        assert!(!request.contains("dyn"));
        assert!(!request.contains("content"));
    }

    #[test]
    fn test_fixed_attributes() {
        let request = Notification::new("a@b.com", 77, "tok").request();

        assert_eq!(request.get("synchrotype"), Some(&ParamValue::text("NOTHING")));
        assert_eq!(request.get("uidkey"), Some(&ParamValue::text("email")));
        assert_eq!(request.get("notificationId"), Some(&ParamValue::Int(77)));
    }

    #[test]
    fn test_senddate_wire_format() {
        let send_at = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 5).unwrap();
        let json = Notification::new("a@b.com", 77, "tok").request_at(send_at).to_json();

        assert_eq!(json["senddate"], serde_json::json!("2024-07-01T12:00:05"));
    }

    #[test]
    fn test_dyn_entries_present_when_given() {
        let request = Notification::new("a@b.com", 77, "tok")
            .with_dyn("FIRSTNAME", "Ada")
            .request();

        assert_eq!(
            request.get("dyn"),
            Some(&ParamValue::Entries(vec![KeyValue::new("FIRSTNAME", "Ada")]))
        );
    }
}
