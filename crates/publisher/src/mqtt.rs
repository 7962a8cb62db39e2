use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{error, warn};
use model::Coordinate;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Serialize;

const KEEP_ALIVE_SECONDS: u64 = 60;
const RECONNECT_DELAY_SECONDS: u64 = 5;

#[derive(Debug, Serialize)]
pub struct Destination {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for Destination {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            lat: coordinate.lat,
            lon: coordinate.lon,
        }
    }
}

/// The payload handed to a client: their one chosen route, as a WKT linestring.
#[derive(Debug, Serialize)]
pub struct ResultMessage {
    pub client_id: String,
    pub session_id: String,
    pub stop_id: String,
    pub destination: Destination,
    pub route_path: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ResultPublisher {
    client: AsyncClient,
    topic_template: String,
}

impl ResultPublisher {
    pub fn connect(broker: &str, port: u16, topic_template: String) -> (Self, EventLoop) {
        let mut options = MqttOptions::new("urban-os-publisher", broker, port);
        options.set_keep_alive(Duration::from_secs(KEEP_ALIVE_SECONDS));

        let (client, event_loop) = AsyncClient::new(options, 64);
        (
            Self {
                client,
                topic_template,
            },
            event_loop,
        )
    }

    fn topic_for(&self, client_id: &str, session_id: &str) -> String {
        self.topic_template
            .replace("{client_id}", client_id)
            .replace("{session_id}", session_id)
    }

    pub async fn publish(&self, message: &ResultMessage) -> Result<(), rumqttc::ClientError> {
        let topic = self.topic_for(&message.client_id, &message.session_id);
        let payload = serde_json::to_vec(message).expect("ResultMessage is always serializable");
        self.client
            .publish(topic, QoS::AtLeastOnce, true, payload)
            .await
    }
}

/// Drives the MQTT event loop for the lifetime of the process, reconnecting
/// on any connection error instead of letting a dropped broker kill the publisher.
pub async fn drive_event_loop(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(_) => {}
            Err(why) => {
                error!("mqtt event loop error: {why}; reconnecting in {RECONNECT_DELAY_SECONDS}s");
                tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECONDS)).await;
            }
        }
    }
}

pub fn warn_on_publish_failure(client_id: &str, why: &rumqttc::ClientError) {
    warn!("failed to publish result for client {client_id}: {why}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_template_substitutes_both_placeholders() {
        let (publisher, _event_loop) = ResultPublisher::connect(
            "localhost",
            1883,
            "results/client/{client_id}/session/{session_id}/".to_owned(),
        );
        assert_eq!(
            publisher.topic_for("client-1", "session-9"),
            "results/client/client-1/session/session-9/"
        );
    }
}
