use super::{escape_html, Alert};

/// Short description of one alert: host, job tag, and a link to its source.
///
/// `instance` contributes the part before the first `:` (port stripped) and
/// only when it is a string; `job` is appended in brackets. With a
/// generator URL the whole fragment becomes a hyperlink, even when empty.
pub fn summarize(alert: &Alert) -> String {
    let mut fragment = String::new();

    if let Some(instance) = alert.labels.get("instance") {
        let host = instance.as_str().unwrap_or_default();
        let host = host.split(':').next().unwrap_or_default();
        fragment.push_str(&escape_html(host));
    }

    if let Some(job) = alert.labels.get("job") {
        fragment.push_str(&format!("[{}]", escape_html(&job.to_string())));
    }

    if alert.generator_url.is_empty() {
        fragment
    } else {
        format!("<a href='{}'>{}</a>", alert.generator_url, fragment)
    }
}

/// One fragment per alert, in input order.
pub fn summarize_all(alerts: &[Alert]) -> Vec<String> {
    alerts.iter().map(summarize).collect()
}
