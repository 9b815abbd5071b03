use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::core::BenchError;
use crate::source::SampleBatch;

use super::options::WriteMode;

/// One replace-or-insert keyed on `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub key: Bson,
    pub replacement: Document,
}

/// The documents for one trial, converted ahead of the timed write.
#[derive(Debug, Clone, PartialEq)]
pub enum WritePayload {
    Insert(Vec<Document>),
    Upsert(Vec<Upsert>),
}

impl WritePayload {
    /// Converts a batch. In upsert mode every record must carry a non-null
    /// `key_field`.
    pub fn build(
        endpoint: &str,
        batch: &SampleBatch,
        mode: WriteMode,
        key_field: &str,
    ) -> Result<Self, BenchError> {
        match mode {
            WriteMode::Insert => Ok(WritePayload::Insert(
                batch.iter().map(|r| r.to_document()).collect(),
            )),
            WriteMode::Upsert => batch
                .iter()
                .map(|record| -> Result<Upsert, BenchError> {
                    let key = record.key(key_field).ok_or_else(|| BenchError::WriteFailure {
                        endpoint: endpoint.to_string(),
                        reason: format!("record has no value for key field '{}'", key_field),
                    })?;
                    Ok(Upsert {
                        key: key.to_bson(),
                        replacement: record.to_document(),
                    })
                })
                .collect::<Result<Vec<_>, BenchError>>()
                .map(WritePayload::Upsert),
        }
    }
}

/// A collection the runner can time bulk writes against.
#[async_trait]
pub trait WriteTarget: Send {
    /// Human-readable endpoint label used in logs and reports.
    fn name(&self) -> &str;

    /// The timed operation: exactly one logical bulk write.
    async fn write(&mut self, payload: WritePayload) -> Result<(), BenchError>;

    /// Number of documents currently in the collection.
    async fn count(&self) -> Result<u64, BenchError>;

    /// Empties the collection between trials.
    async fn truncate(&mut self) -> Result<(), BenchError>;

    /// Drops the collection if it still exists.
    async fn cleanup(&mut self) -> Result<(), BenchError>;

    async fn close(&mut self) -> Result<(), BenchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldValue, SampleRecord};

    fn batch() -> SampleBatch {
        vec![
            SampleRecord::from_iter([
                ("Bike ID", FieldValue::Int(1)),
                ("Trip Duration", FieldValue::Int(300)),
            ]),
            SampleRecord::from_iter([
                ("Bike ID", FieldValue::Int(2)),
                ("Trip Duration", FieldValue::Int(900)),
            ]),
        ]
        .into()
    }

    #[test]
    fn test_insert_payload() {
        let payload = WritePayload::build("MongoDB", &batch(), WriteMode::Insert, "Bike ID").unwrap();
        match payload {
            WritePayload::Insert(docs) => {
                assert_eq!(docs.len(), 2);
                assert!(!docs[0].contains_key("_id"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_upsert_payload_keys() {
        let payload = WritePayload::build("MongoDB", &batch(), WriteMode::Upsert, "Bike ID").unwrap();
        match payload {
            WritePayload::Upsert(ups) => {
                let keys: Vec<Bson> = ups.iter().map(|u| u.key.clone()).collect();
                assert_eq!(keys, vec![Bson::Int64(1), Bson::Int64(2)]);
                assert_eq!(ups[1].replacement.get_i64("Trip Duration").unwrap(), 900);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_upsert_payload_missing_key() {
        let result = WritePayload::build("DocDB", &batch(), WriteMode::Upsert, "bikeid");
        match result {
            Err(BenchError::WriteFailure { endpoint, reason }) => {
                assert_eq!(endpoint, "DocDB");
                assert!(reason.contains("bikeid"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
