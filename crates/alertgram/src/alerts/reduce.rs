use super::{escape_html, LabelSet, LabelValue};

/// Formatted label and annotation lines of one alert group, each sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducedLabels {
    pub group_labels: Vec<String>,
    /// Common labels whose key is not already a group label.
    pub common_labels: Vec<String>,
    /// Each line starts with its own line break.
    pub common_annotations: Vec<String>,
}

pub fn reduce(
    group_labels: &LabelSet,
    common_labels: &LabelSet,
    common_annotations: &LabelSet,
) -> ReducedLabels {
    // LabelSet iterates in key order, so no explicit sort is needed.
    let group = group_labels
        .iter()
        .map(|(k, v)| label_line(k, v))
        .collect();

    // Set difference by key: a common label sharing a key with a group label
    // is dropped even when the values differ.
    let common = common_labels
        .iter()
        .filter(|(k, _)| !group_labels.contains_key(*k))
        .map(|(k, v)| label_line(k, v))
        .collect();

    let annotations = common_annotations
        .iter()
        .map(|(k, v)| {
            format!(
                "\n{}: <code>{}</code>",
                escape_html(k),
                escape_html(&v.to_string())
            )
        })
        .collect();

    ReducedLabels {
        group_labels: group,
        common_labels: common,
        common_annotations: annotations,
    }
}

fn label_line(key: &str, value: &LabelValue) -> String {
    format!(
        "{}=<code>{}</code>",
        escape_html(key),
        escape_html(&value.to_string())
    )
}
