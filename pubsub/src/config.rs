use std::time::Duration;

/// Environment variable naming the Pub/Sub emulator host, as understood by the Cloud SDKs.
pub const EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Texts of the messages published by the walkthrough, in publishing order.
pub const MESSAGES: [&str; 4] = [
    "Hello from Pub/Sub emulator!",
    "This is message number 2",
    "Testing Pub/Sub functionality",
    "Final test message",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `host:port` of the emulator's gRPC endpoint.
    pub emulator_host: String,
    pub project_id: String,
    pub topic: String,
    pub subscription: String,
    pub messages: Vec<String>,
    /// Pause between two publishes.
    pub publish_interval: Duration,
    /// Upper bound on waiting for every published message to come back after the last publish.
    pub drain_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emulator_host: "localhost:8085".to_string(),
            project_id: "test-project".to_string(),
            topic: "test-topic".to_string(),
            subscription: "test-subscription".to_string(),
            messages: MESSAGES.iter().map(|v| v.to_string()).collect(),
            publish_interval: Duration::from_secs(1),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Default configuration with the emulator host taken from `PUBSUB_EMULATOR_HOST` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(host) = std::env::var(EMULATOR_HOST_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            config.emulator_host = host.trim().to_string();
        }
        config
    }

    /// Payloads as published: `Message <n>: <text>`, numbered from 1.
    pub fn numbered_messages(&self) -> Vec<String> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, text)| format!("Message {}: {}", i + 1, text))
            .collect()
    }
}
