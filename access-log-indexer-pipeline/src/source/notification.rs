//! Object-created notifications.
//!
//! Decodes the S3 event-notification document into object locations.

use access_log_indexer_shared::ObjectLocation;
use serde::Deserialize;

use super::SourceError;

/// A newly arrived object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNotification {
    pub location: ObjectLocation,
    /// Size announced by the notification, if any.
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventDocument {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    aws_region: Option<String>,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
    size: Option<u64>,
}

/// Parse an event document into one notification per record.
///
/// Records without a region fall back to `default_region`. Keys arrive
/// form-encoded and are decoded here.
pub fn parse_notification(
    payload: &str,
    default_region: &str,
) -> Result<Vec<ObjectNotification>, SourceError> {
    let document: EventDocument = serde_json::from_str(payload)
        .map_err(|e| SourceError::invalid_notification(e.to_string()))?;

    document
        .records
        .into_iter()
        .map(|record| {
            let key = decode_key(&record.s3.object.key)?;
            let region = record
                .aws_region
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| default_region.to_string());
            Ok(ObjectNotification {
                location: ObjectLocation::new(region, record.s3.bucket.name, key),
                size: record.s3.object.size,
            })
        })
        .collect()
}

fn decode_key(raw: &str) -> Result<String, SourceError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| SourceError::invalid_notification(format!("key {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "Records": [
            {
                "eventName": "ObjectCreated:Put",
                "awsRegion": "eu-west-1",
                "s3": {
                    "bucket": { "name": "my-logs" },
                    "object": { "key": "AWSLogs/2015/05/13/my+elb%2B1.log.gz", "size": 1024 }
                }
            },
            {
                "s3": {
                    "bucket": { "name": "other" },
                    "object": { "key": "plain.log" }
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_records() {
        let notifications = parse_notification(EVENT, "us-east-1").unwrap();

        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications[0].location,
            ObjectLocation::new("eu-west-1", "my-logs", "AWSLogs/2015/05/13/my elb+1.log.gz")
        );
        assert_eq!(notifications[0].size, Some(1024));
        assert_eq!(notifications[1].location.region, "us-east-1");
        assert_eq!(notifications[1].size, None);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_notification("{}", "us-east-1").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_document() {
        let result = parse_notification("not json", "us-east-1");
        assert!(matches!(result, Err(SourceError::InvalidNotification(_))));
    }
}
