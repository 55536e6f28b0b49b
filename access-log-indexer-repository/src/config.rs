//! Index naming configuration.

use chrono::{DateTime, Utc};

/// Default prefix of the daily indices.
pub const DEFAULT_INDEX_PREFIX: &str = "logstash-elb";

/// Default document-type tag attached to every bulk item.
pub const DEFAULT_DOCUMENT_TYPE: &str = "elb-access-log";

/// How documents are addressed in the backend.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Prefix of the daily index names (`{prefix}-YYYY.MM.DD`).
    pub prefix: String,
    /// Document-type tag attached to every bulk item.
    pub document_type: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_INDEX_PREFIX.to_string(),
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
        }
    }
}

impl IndexConfig {
    /// Create a config with a custom index prefix and the default document type.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Name of the daily index holding documents stamped with `timestamp`.
    pub fn index_for(&self, timestamp: &DateTime<Utc>) -> String {
        format!("{}-{}", self.prefix, timestamp.format("%Y.%m.%d"))
    }

    /// Wildcard matching every daily index of this prefix.
    pub fn index_pattern(&self) -> String {
        format!("{}-*", self.prefix)
    }

    /// Name of the index template covering [`Self::index_pattern`].
    pub fn template_name(&self) -> String {
        format!("{}-template", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_index_for_date() {
        let config = IndexConfig::with_prefix("logstash-prod");
        let ts = Utc.with_ymd_and_hms(2015, 5, 3, 23, 59, 59).unwrap();

        assert_eq!(config.index_for(&ts), "logstash-prod-2015.05.03");
    }

    #[test]
    fn test_index_pattern_and_template() {
        let config = IndexConfig::default();
        assert_eq!(config.index_pattern(), "logstash-elb-*");
        assert_eq!(config.template_name(), "logstash-elb-template");
        assert_eq!(config.document_type, "elb-access-log");
    }
}
