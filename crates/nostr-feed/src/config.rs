use std::time::Duration;

/// Feed loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// `limit` sent with the post filter. A request hint, not a cap on the timeline.
    pub page_size: u64,
    /// How long to wait for every relay's EOSE. `None` waits indefinitely.
    pub eose_timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            eose_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl FeedConfig {
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_eose_timeout(mut self, eose_timeout: Option<Duration>) -> Self {
        self.eose_timeout = eose_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.eose_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_builders() {
        let config = FeedConfig::default()
            .with_page_size(20)
            .with_eose_timeout(None);
        assert_eq!(config.page_size, 20);
        assert!(config.eose_timeout.is_none());
    }
}
