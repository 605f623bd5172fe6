use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

/// A transient warning with an explicit clear deadline. Callers decide when
/// "now" is, so expiry is testable without sleeping.
#[derive(Debug, Clone)]
pub struct Notice {
    message: String,
    deadline: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_ttl(message, DEFAULT_TTL)
    }

    pub fn with_ttl(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            deadline: Instant::now() + ttl,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_active(&self, now: Instant) -> bool {
        now < self.deadline
    }
}
