use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar value of a label or annotation.
///
/// Alertmanager always sends strings, but other producers hit the same
/// endpoint with numbers, booleans and nulls, so all of them are accepted
/// and rendered through `Display`. Null renders as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl LabelValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LabelValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Default for LabelValue {
    fn default() -> Self {
        LabelValue::String(String::new())
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Null => Ok(()),
            LabelValue::Bool(b) => write!(f, "{}", b),
            LabelValue::Number(n) => write!(f, "{}", n),
            LabelValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        LabelValue::String(value.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(value: String) -> Self {
        LabelValue::String(value)
    }
}

impl From<i64> for LabelValue {
    fn from(value: i64) -> Self {
        LabelValue::Number(value.into())
    }
}

impl From<bool> for LabelValue {
    fn from(value: bool) -> Self {
        LabelValue::Bool(value)
    }
}

/// Keys are unique and iterate in byte-wise ascending order.
pub type LabelSet = BTreeMap<String, LabelValue>;

// Alertmanager webhook payload structures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertGroup {
    #[serde(default)]
    pub version: LabelValue,
    #[serde(rename = "groupKey", default)]
    pub group_key: LabelValue,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(rename = "groupLabels", default)]
    pub group_labels: LabelSet,
    #[serde(rename = "commonLabels", default)]
    pub common_labels: LabelSet,
    #[serde(rename = "commonAnnotations", default)]
    pub common_annotations: LabelSet,
    #[serde(rename = "externalURL", default)]
    pub external_url: String,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub annotations: LabelSet,
    #[serde(rename = "startsAt", default)]
    pub starts_at: String,
    /// End of the alert. Producers of this payload send it as `sendsAt`,
    /// not `endsAt`; the wire name is kept for compatibility with them.
    #[serde(rename = "sendsAt", default)]
    pub ends_at: String,
    #[serde(rename = "generatorURL", default)]
    pub generator_url: String,
    #[serde(default)]
    pub fingerprint: String,
}

impl AlertGroup {
    pub fn from_slice(raw: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Upper-cased status tag, as shown in the message header.
    pub fn status_tag(&self) -> String {
        self.status.to_uppercase()
    }
}
