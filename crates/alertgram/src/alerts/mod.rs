mod model;
mod reduce;
mod summary;

pub use model::{Alert, AlertGroup, LabelSet, LabelValue};
pub use reduce::{reduce, ReducedLabels};
pub use summary::{summarize, summarize_all};

/// Escapes text for Telegram's HTML parse mode.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
