//! Message templates using Tera
//!
//! Templates are parsed once at startup into a [`MessageTemplate`] and then
//! rendered per alert group. Go template field syntax (`{{ .Status }}`) is
//! converted to Tera syntax before parsing, so existing templates keep
//! working for simple field access.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};

use crate::alerts::{Alert, AlertGroup, LabelSet, LabelValue};
use crate::{Error, Result};

lazy_static! {
    static ref DEFAULT_DOUBLE_QUOTED: Regex =
        Regex::new(r#"\{\{([^}]+)\|\s*default\s+"([^"]+)"\s*\}\}"#).expect("valid regex");
    static ref DEFAULT_SINGLE_QUOTED: Regex =
        Regex::new(r#"\{\{([^}]+)\|\s*default\s+'([^']+)'\s*\}\}"#).expect("valid regex");
    static ref DEFAULT_BARE: Regex =
        Regex::new(r#"\{\{([^}]+)\|\s*default\s+([^}\s(]+)\s*\}\}"#).expect("valid regex");
}

const TEMPLATE_NAME: &str = "message";

/// Convert Go template syntax to Tera syntax
///
/// Handles common patterns:
/// - {{ .Path.To.Value }} -> {{ Path.To.Value }}
/// - {{ .Value | default "default" }} -> {{ Value | default(value="default") }}
pub fn convert_go_to_tera(template: &str) -> String {
    let converted = template.replace("{{ .", "{{ ").replace("{{.", "{{");

    let converted = DEFAULT_DOUBLE_QUOTED.replace_all(&converted, "{{$1| default(value=\"$2\") }}");
    let converted = DEFAULT_SINGLE_QUOTED.replace_all(&converted, "{{$1| default(value=\"$2\") }}");
    let converted = DEFAULT_BARE.replace_all(&converted, "{{$1| default(value=\"$2\") }}");

    converted.into_owned()
}

/// A parsed, immutable template shared by all requests.
#[derive(Debug)]
pub struct MessageTemplate {
    tera: Tera,
}

impl MessageTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        // Output goes to Telegram verbatim, whatever the template file is named.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, &convert_go_to_tera(source))
            .map_err(|e| Error::Template(format!("Failed to parse template: {}", e)))?;
        Ok(Self { tera })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    pub fn render(&self, group: &AlertGroup) -> Result<String> {
        let context = Context::from_serialize(GroupView::from(group))
            .map_err(|e| Error::Template(format!("Failed to build template context: {}", e)))?;

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| Error::Template(format!("Failed to render template: {}", render_chain(&e))))
    }
}

// Tera hides the useful part of render errors in the source chain.
fn render_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Field names as templates see them.
#[derive(Serialize)]
struct GroupView<'a> {
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Receiver")]
    receiver: &'a str,
    #[serde(rename = "ExternalURL")]
    external_url: &'a str,
    #[serde(rename = "GroupKey")]
    group_key: &'a LabelValue,
    #[serde(rename = "Version")]
    version: &'a LabelValue,
    #[serde(rename = "GroupLabels")]
    group_labels: &'a LabelSet,
    #[serde(rename = "CommonLabels")]
    common_labels: &'a LabelSet,
    #[serde(rename = "CommonAnnotations")]
    common_annotations: &'a LabelSet,
    #[serde(rename = "Alerts")]
    alerts: Vec<AlertView<'a>>,
}

#[derive(Serialize)]
struct AlertView<'a> {
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Labels")]
    labels: &'a LabelSet,
    #[serde(rename = "Annotations")]
    annotations: &'a LabelSet,
    #[serde(rename = "StartsAt")]
    starts_at: &'a str,
    #[serde(rename = "EndsAt")]
    ends_at: &'a str,
    #[serde(rename = "GeneratorURL")]
    generator_url: &'a str,
    #[serde(rename = "Fingerprint")]
    fingerprint: &'a str,
}

impl<'a> From<&'a AlertGroup> for GroupView<'a> {
    fn from(group: &'a AlertGroup) -> Self {
        Self {
            status: &group.status,
            receiver: &group.receiver,
            external_url: &group.external_url,
            group_key: &group.group_key,
            version: &group.version,
            group_labels: &group.group_labels,
            common_labels: &group.common_labels,
            common_annotations: &group.common_annotations,
            alerts: group.alerts.iter().map(AlertView::from).collect(),
        }
    }
}

impl<'a> From<&'a Alert> for AlertView<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            status: &alert.status,
            labels: &alert.labels,
            annotations: &alert.annotations,
            starts_at: &alert.starts_at,
            ends_at: &alert.ends_at,
            generator_url: &alert.generator_url,
            fingerprint: &alert.fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(status: &str) -> AlertGroup {
        let mut group = AlertGroup {
            status: status.to_string(),
            receiver: "ops".to_string(),
            ..Default::default()
        };
        group
            .common_labels
            .insert("severity".to_string(), "page".into());
        group.alerts.push(Alert {
            labels: [("instance".to_string(), LabelValue::from("db-1:9100"))]
                .into_iter()
                .collect(),
            ..Default::default()
        });
        group
    }

    #[test]
    fn test_convert_go_to_tera() {
        let tests = vec![
            ("{{ .Status }}", "{{ Status }}"),
            ("{{ .CommonLabels.severity }}", "{{ CommonLabels.severity }}"),
            ("{{.Status}}", "{{Status}}"),
            ("{{ .Receiver | default \"none\" }}", "{{ Receiver | default(value=\"none\") }}"),
            ("{{ .Receiver | default 'none' }}", "{{ Receiver | default(value=\"none\") }}"),
            ("{{ .Count | default 0 }}", "{{ Count | default(value=\"0\") }}"),
        ];

        for (input, expected) in tests {
            assert_eq!(convert_go_to_tera(input), expected);
        }
    }

    #[test]
    fn test_render_status_verbatim() {
        let template = MessageTemplate::parse("{{.Status}}").unwrap();
        assert_eq!(template.render(&group("resolved")).unwrap(), "resolved");
    }

    #[test]
    fn test_render_nested_fields_and_loops() {
        let template = MessageTemplate::parse(
            "[{{ .Status | upper }}] {{ .CommonLabels.severity }} \
             {% for a in Alerts %}<{{ a.Labels.instance }}>{% endfor %}",
        )
        .unwrap();
        assert_eq!(
            template.render(&group("firing")).unwrap(),
            "[FIRING] page <db-1:9100>"
        );
    }

    #[test]
    fn test_render_does_not_escape() {
        let template = MessageTemplate::parse("<b>{{ Receiver }}</b> & co").unwrap();
        assert_eq!(template.render(&group("firing")).unwrap(), "<b>ops</b> & co");
    }

    #[test]
    fn test_shipped_template_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates/default.tmpl");
        let template = MessageTemplate::from_file(&path).unwrap();
        let text = template.render(&group("firing")).unwrap();
        assert!(text.starts_with("<b>[FIRING:1]</b> alert"));
        assert!(text.contains("db-1:9100"));
    }

    #[test]
    fn test_parse_error() {
        let err = MessageTemplate::parse("{% for %}").unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_render_error_on_missing_field() {
        let template = MessageTemplate::parse("{{ NoSuchField }}").unwrap();
        let err = template.render(&group("firing")).unwrap_err();
        assert!(err.to_string().contains("Failed to render template"));
    }
}
