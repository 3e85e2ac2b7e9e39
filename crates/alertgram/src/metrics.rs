use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ALERT_GROUPS_RECEIVED_TOTAL: IntCounter = counter(
        "alertgram_alert_groups_received_total",
        "Total number of alert groups received on the webhook."
    );
    pub static ref MESSAGES_DELIVERED_TOTAL: IntCounter = counter(
        "alertgram_messages_delivered_total",
        "Total number of alert messages delivered to Telegram."
    );
    pub static ref DELIVERY_FAILURES_TOTAL: IntCounter = counter(
        "alertgram_delivery_failures_total",
        "Total number of alert messages Telegram rejected or never received."
    );
    pub static ref CHAT_ANNOUNCEMENTS_TOTAL: IntCounter = counter(
        "alertgram_chat_announcements_total",
        "Total number of chat id announcements sent to new groups."
    );
}

fn counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("valid metric definition");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered once");
    counter
}

// Function to gather metrics for exposition
pub fn gather_metrics() -> String {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
