use std::env;
use std::time::Duration;

fn env_duration_secs(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    pub mqtt_results_topic: String,
    pub poll_interval: Duration,
    pub dedup_window: Duration,
}

impl PublisherConfig {
    pub fn from_env() -> Self {
        Self {
            mqtt_broker: env::var("MQTT_BROKER").expect("expected MQTT_BROKER in env."),
            mqtt_port: env::var("MQTT_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1883),
            mqtt_results_topic: env_or(
                "MQTT_RESULTS_TOPIC",
                "results/client/{client_id}/session/{session_id}/",
            ),
            poll_interval: env_duration_secs("PUBLISHER_POLL_SECONDS", 5),
            dedup_window: env_duration_secs("PUBLISHER_DEDUP_WINDOW_SECONDS", 600),
        }
    }
}
