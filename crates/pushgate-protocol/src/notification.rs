//! Notification payload model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::DEVICE_TOKEN_HEX_LEN;
use crate::error::ProtocolResult;

/// Alert content shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Optional short title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Alert body text.
    pub body: String,
}

impl Alert {
    /// Creates an alert with just a body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One push notification addressed to a single device.
///
/// The sequence id used for error correlation is not part of the
/// notification; the dispatch loop assigns it at send time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Device token as a 64-character hex string.
    pub device_token: String,

    /// Alert content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,

    /// Badge count to display on the app icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,

    /// Sound to play on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,

    /// Custom keys merged at the top level of the JSON payload.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
}

impl Notification {
    /// Creates a notification for the given device token.
    pub fn new(device_token: impl Into<String>) -> Self {
        Self {
            device_token: device_token.into(),
            ..Self::default()
        }
    }

    /// Builder: set the alert body.
    pub fn alert(mut self, body: impl Into<String>) -> Self {
        self.alert = Some(Alert::new(body));
        self
    }

    /// Builder: set the full alert.
    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alert = Some(alert);
        self
    }

    /// Builder: set the badge count.
    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Builder: set the sound.
    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Builder: add a custom top-level key.
    pub fn custom(mut self, key: impl Into<String>, value: Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }

    /// Returns true when the device token is exactly 64 hex characters.
    pub fn has_valid_token(&self) -> bool {
        self.device_token.len() == DEVICE_TOKEN_HEX_LEN
            && self.device_token.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Serializes the notification to its APS JSON form.
    ///
    /// The `aps` dictionary carries alert/badge/sound; custom keys sit
    /// beside it at the top level.
    pub fn to_json(&self) -> ProtocolResult<String> {
        let mut aps = Map::new();
        if let Some(ref alert) = self.alert {
            aps.insert("alert".to_string(), serde_json::to_value(alert)?);
        }
        if let Some(badge) = self.badge {
            aps.insert("badge".to_string(), json!(badge));
        }
        if let Some(ref sound) = self.sound {
            aps.insert("sound".to_string(), json!(sound));
        }

        let mut root = Map::new();
        root.insert("aps".to_string(), Value::Object(aps));
        for (key, value) in &self.custom {
            root.insert(key.clone(), value.clone());
        }

        Ok(serde_json::to_string(&Value::Object(root))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "334b1ddfc30c4582c497c058c0d94ccfad6409b27fa1ffbf6f3724277ba33e54";

    #[test]
    fn builder_sets_fields() {
        let notification = Notification::new(TOKEN)
            .alert("hello")
            .badge(3)
            .sound("default")
            .custom("thread", json!("chat-1"));

        assert_eq!(notification.device_token, TOKEN);
        assert_eq!(notification.alert, Some(Alert::new("hello")));
        assert_eq!(notification.badge, Some(3));
        assert_eq!(notification.sound, Some("default".to_string()));
        assert_eq!(notification.custom.get("thread"), Some(&json!("chat-1")));
    }

    #[test]
    fn json_nests_aps_and_merges_custom_keys() {
        let notification = Notification::new(TOKEN)
            .alert("hello")
            .badge(1)
            .custom("kind", json!("greeting"));

        let value: Value = serde_json::from_str(&notification.to_json().unwrap()).unwrap();
        assert_eq!(value["aps"]["alert"]["body"], json!("hello"));
        assert_eq!(value["aps"]["badge"], json!(1));
        assert_eq!(value["kind"], json!("greeting"));
    }

    #[test]
    fn json_omits_unset_fields() {
        let notification = Notification::new(TOKEN).alert("hi");
        let json = notification.to_json().unwrap();
        assert!(!json.contains("badge"));
        assert!(!json.contains("sound"));
    }

    #[test]
    fn alert_with_title() {
        let alert = Alert::new("body").with_title("title");
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value, json!({"title": "title", "body": "body"}));
    }

    #[test]
    fn token_validation() {
        assert!(Notification::new(TOKEN).has_valid_token());
        assert!(!Notification::new("deadbeef").has_valid_token());
        assert!(!Notification::new("z".repeat(64)).has_valid_token());
        assert!(!Notification::new(format!("{TOKEN}00")).has_valid_token());
    }
}
