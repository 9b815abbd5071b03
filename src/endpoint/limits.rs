use mongodb::bson::{Bson, Document};

use crate::core::BenchError;

/// Server defaults when `hello` omits a limit.
const DEFAULT_MAX_WRITE_BATCH_SIZE: usize = 100_000;
const DEFAULT_MAX_BSON_OBJECT_SIZE: usize = 16 * 1024 * 1024;

/// Write batching limits an endpoint advertises in its `hello` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteLimits {
    pub max_write_batch_size: usize,
    pub max_bson_object_size: usize,
}

impl Default for WriteLimits {
    fn default() -> Self {
        Self {
            max_write_batch_size: DEFAULT_MAX_WRITE_BATCH_SIZE,
            max_bson_object_size: DEFAULT_MAX_BSON_OBJECT_SIZE,
        }
    }
}

impl WriteLimits {
    pub fn from_hello(reply: &Document) -> Self {
        let defaults = Self::default();
        Self {
            max_write_batch_size: positive(reply, "maxWriteBatchSize")
                .unwrap_or(defaults.max_write_batch_size),
            max_bson_object_size: positive(reply, "maxBsonObjectSize")
                .unwrap_or(defaults.max_bson_object_size),
        }
    }

    /// Caps the entry count per command below the server's own limit.
    pub fn with_batch_cap(self, cap: Option<usize>) -> Self {
        match cap {
            Some(cap) => Self {
                max_write_batch_size: self.max_write_batch_size.min(cap.max(1)),
                ..self
            },
            None => self,
        }
    }

    /// Splits write statements into the fewest commands that fit both the
    /// entry-count and the encoded-size limit, keeping their order.
    pub fn split(
        &self,
        endpoint: &str,
        statements: Vec<Document>,
    ) -> Result<Vec<Vec<Bson>>, BenchError> {
        let mut batches = Vec::new();
        let mut current: Vec<Bson> = Vec::new();
        let mut size = 0;

        for statement in statements {
            let encoded = encoded_len(endpoint, &statement)?;
            if encoded > self.max_bson_object_size {
                return Err(BenchError::WriteFailure {
                    endpoint: endpoint.to_string(),
                    reason: format!(
                        "update statement of {} bytes exceeds maxBsonObjectSize {}",
                        encoded, self.max_bson_object_size
                    ),
                });
            }

            let full = current.len() == self.max_write_batch_size
                || size + array_entry_len(current.len(), encoded) > self.max_bson_object_size;
            if full && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                size = 0;
            }
            size += array_entry_len(current.len(), encoded);
            current.push(Bson::Document(statement));
        }

        if !current.is_empty() {
            batches.push(current);
        }
        Ok(batches)
    }
}

fn positive(reply: &Document, key: &str) -> Option<usize> {
    let value = match reply.get(key)? {
        Bson::Int32(v) => i64::from(*v),
        Bson::Int64(v) => *v,
        Bson::Double(v) => *v as i64,
        _ => return None,
    };
    usize::try_from(value).ok().filter(|v| *v > 0)
}

fn encoded_len(endpoint: &str, doc: &Document) -> Result<usize, BenchError> {
    let mut buf = Vec::new();
    doc.to_writer(&mut buf)
        .map_err(|e| BenchError::WriteFailure {
            endpoint: endpoint.to_string(),
            reason: format!("encoding update statement: {}", e),
        })?;
    Ok(buf.len())
}

/// Element type byte, decimal index key with its terminator, then the document.
fn array_entry_len(index: usize, doc_len: usize) -> usize {
    1 + index.to_string().len() + 1 + doc_len
}
