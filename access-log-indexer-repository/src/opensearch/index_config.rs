//! OpenSearch index template for the daily access log indices.

use serde_json::{json, Value};

use crate::config::IndexConfig;

/// Get the index template body for the daily access log indices.
///
/// The template includes:
/// - **date**: the normalized `@timestamp` time axis
/// - **ip**: the client address
/// - **numeric fields**: latencies, status codes and byte counts
/// - **keyword strings**: every other string field via a dynamic template
pub fn get_index_template(config: &IndexConfig) -> Value {
    json!({
        "index_patterns": [config.index_pattern()],
        "template": {
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 1
            },
            "mappings": {
                "dynamic_templates": [
                    {
                        "strings_as_keywords": {
                            "match_mapping_type": "string",
                            "mapping": { "type": "keyword", "ignore_above": 1024 }
                        }
                    }
                ],
                "properties": {
                    "@timestamp": { "type": "date" },
                    "clientip": { "type": "ip" },
                    "request_processing_time": { "type": "float" },
                    "backend_processing_time": { "type": "float" },
                    "response_processing_time": { "type": "float" },
                    "elb_status_code": { "type": "integer" },
                    "backend_status_code": { "type": "integer" },
                    "sent_bytes": { "type": "long" },
                    "logbucket": { "type": "keyword" },
                    "type": { "type": "keyword" }
                }
            }
        }
    })
}
