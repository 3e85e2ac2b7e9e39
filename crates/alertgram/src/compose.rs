use std::sync::Arc;

use crate::alerts::{reduce, summarize_all, AlertGroup};
use crate::telegram::{OutgoingMessage, ParseMode};
use crate::template::MessageTemplate;
use crate::Result;

/// Message text plus the rendering flags it is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub text: String,
    pub parse_mode: ParseMode,
    pub disable_web_page_preview: bool,
}

impl ComposedMessage {
    pub fn html(text: String) -> Self {
        Self {
            text,
            parse_mode: ParseMode::Html,
            disable_web_page_preview: true,
        }
    }

    pub fn to_outgoing(&self, chat_id: i64) -> OutgoingMessage {
        OutgoingMessage {
            chat_id,
            text: self.text.clone(),
            parse_mode: Some(self.parse_mode),
            disable_web_page_preview: self.disable_web_page_preview,
        }
    }
}

/// Turns alert groups into messages, through the template when one was
/// configured at startup and the fixed layout otherwise.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    template: Option<Arc<MessageTemplate>>,
}

impl Composer {
    pub fn new(template: Option<Arc<MessageTemplate>>) -> Self {
        Self { template }
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// A render failure is returned as is; there is no fallback to the
    /// fixed layout.
    pub fn compose(&self, group: &AlertGroup) -> Result<ComposedMessage> {
        let text = match &self.template {
            Some(template) => template.render(group)?,
            None => fixed_layout(group),
        };
        Ok(ComposedMessage::html(text))
    }
}

pub fn fixed_layout(group: &AlertGroup) -> String {
    let reduced = reduce(
        &group.group_labels,
        &group.common_labels,
        &group.common_annotations,
    );
    let details = summarize_all(&group.alerts);

    format!(
        "<a href='{}/#/alerts?receiver={}'>[{}:{}]</a>\ngrouped by: {}\nlabels: {}{}\n{}",
        group.external_url,
        group.receiver,
        group.status_tag(),
        group.alerts.len(),
        reduced.group_labels.join(", "),
        reduced.common_labels.join(", "),
        reduced.common_annotations.concat(),
        details.join(", "),
    )
}
