use mongodb::bson::{Bson, Document};
use mongodb::error::{Error, ErrorKind, WriteFailure};

use crate::core::BenchError;

pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Whether a command reply reports `ok: 1`.
pub fn reply_ok(reply: &Document) -> bool {
    match reply.get("ok") {
        Some(Bson::Double(v)) => *v == 1.0,
        Some(Bson::Int32(v)) => *v == 1,
        Some(Bson::Int64(v)) => *v == 1,
        Some(Bson::Boolean(v)) => *v,
        _ => false,
    }
}

pub fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::InsertMany(insert_err) => insert_err
            .write_errors
            .as_ref()
            .is_some_and(|errs| errs.iter().any(|e| e.code == DUPLICATE_KEY_CODE)),
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => {
            write_err.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(cmd_err) => cmd_err.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Maps a driver error raised by a bulk write.
pub fn write_error(endpoint: &str, err: Error) -> BenchError {
    if is_duplicate_key(&err) {
        BenchError::DuplicateKeyFailure {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    } else {
        BenchError::WriteFailure {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Inspects the reply of a raw `update` command. Per-document failures come
/// back in `writeErrors` on an otherwise successful reply.
pub fn check_write_reply(endpoint: &str, reply: &Document) -> Result<(), BenchError> {
    if let Ok(errors) = reply.get_array("writeErrors") {
        if let Some(first) = errors.iter().find_map(Bson::as_document) {
            let code = first.get_i32("code").unwrap_or_default();
            let message = first.get_str("errmsg").unwrap_or("unknown write error");
            let reason = format!("{} write error(s), first: ({}) {}", errors.len(), code, message);
            return Err(if code == DUPLICATE_KEY_CODE {
                BenchError::DuplicateKeyFailure {
                    endpoint: endpoint.to_string(),
                    reason,
                }
            } else {
                BenchError::WriteFailure {
                    endpoint: endpoint.to_string(),
                    reason,
                }
            });
        }
    }
    if let Ok(wce) = reply.get_document("writeConcernError") {
        return Err(BenchError::WriteFailure {
            endpoint: endpoint.to_string(),
            reason: format!(
                "write concern error: {}",
                wce.get_str("errmsg").unwrap_or("unknown")
            ),
        });
    }
    if !reply_ok(reply) {
        return Err(BenchError::WriteFailure {
            endpoint: endpoint.to_string(),
            reason: format!("update returned {}", reply),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_reply_ok_variants() {
        assert!(reply_ok(&doc! { "ok": 1.0 }));
        assert!(reply_ok(&doc! { "ok": 1 }));
        assert!(reply_ok(&doc! { "ok": 1_i64, "isWritablePrimary": true }));
        assert!(!reply_ok(&doc! { "ok": 0.0, "errmsg": "no" }));
        assert!(!reply_ok(&doc! { "isWritablePrimary": true }));
    }

    #[test]
    fn test_clean_update_reply() {
        let reply = doc! { "n": 3, "nModified": 1, "upserted": [], "ok": 1.0 };
        assert_eq!(check_write_reply("MongoDB", &reply), Ok(()));
    }

    #[test]
    fn test_duplicate_key_in_reply() {
        let reply = doc! {
            "n": 0,
            "writeErrors": [
                { "index": 0, "code": 11000, "errmsg": "E11000 duplicate key error" }
            ],
            "ok": 1.0
        };
        match check_write_reply("DocDB", &reply) {
            Err(BenchError::DuplicateKeyFailure { endpoint, reason }) => {
                assert_eq!(endpoint, "DocDB");
                assert!(reason.contains("E11000"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_other_write_error_in_reply() {
        let reply = doc! {
            "writeErrors": [ { "index": 2, "code": 2, "errmsg": "bad value" } ],
            "ok": 1.0
        };
        assert!(matches!(
            check_write_reply("MongoDB", &reply),
            Err(BenchError::WriteFailure { .. })
        ));
    }

    #[test]
    fn test_write_concern_error_in_reply() {
        let reply = doc! { "writeConcernError": { "code": 64, "errmsg": "waiting for replication timed out" }, "ok": 1.0 };
        assert!(matches!(
            check_write_reply("MongoDB", &reply),
            Err(BenchError::WriteFailure { .. })
        ));
    }
}
