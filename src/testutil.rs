//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use mongodb::bson::{Bson, Document};
use zip::write::SimpleFileOptions;

use crate::bench::{Upsert, WritePayload, WriteTarget};
use crate::conf::TargetConfig;
use crate::core::{BenchError, FieldValue, SampleRecord};
use crate::endpoint::Connector;
use crate::source::ArchivePartition;

pub const TRIP_HEADER: &str = "Trip Duration,Start Time,Start Station Name,Start Station Latitude,Bike ID,User Type";

/// Deterministic trip rows. Row `i` of partition `p` has a `Bike ID` unique
/// across partitions so upserts never collapse rows.
pub fn trip_csv(partition: &ArchivePartition, rows: usize) -> String {
    let base = NaiveDate::from_ymd_opt(partition.year, partition.month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid partition date");
    let id_offset = (partition.year as usize * 12 + partition.month as usize) * 1_000_000;

    let mut out = String::with_capacity(rows * 80);
    out.push_str(TRIP_HEADER);
    out.push('\n');
    for i in 0..rows {
        let start = base + Duration::seconds(i as i64 * 37);
        out.push_str(&format!(
            "{},{},Station {},{:.5},{},{}\n",
            300 + i % 900,
            start.format("%Y-%m-%d %H:%M:%S"),
            i % 40,
            40.7 + (i % 100) as f64 / 1000.0,
            id_offset + i,
            if i % 3 == 0 { "Customer" } else { "Subscriber" },
        ));
    }
    out
}

/// Writes a zipped monthly extract the way the trip archive publishes them.
pub fn write_zip_partition(
    dir: &Path,
    partition: &ArchivePartition,
    template: &str,
    rows: usize,
) -> std::io::Result<()> {
    let name = partition.render(template);
    let entry = name.trim_end_matches(".zip").to_string();
    let file = File::create(dir.join(&name))?;
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file(entry, SimpleFileOptions::default())
        .map_err(std::io::Error::other)?;
    writer.write_all(trip_csv(partition, rows).as_bytes())?;
    writer.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// In-memory records with a unique `Bike ID` and a `row` marker.
pub fn generate_records(num_rows: usize) -> Vec<SampleRecord> {
    (0..num_rows)
        .map(|i| {
            SampleRecord::from_iter([
                ("row", FieldValue::Int(i as i64)),
                ("Bike ID", FieldValue::Int(10_000 + i as i64)),
                ("Trip Duration", FieldValue::Int(300 + (i % 900) as i64)),
            ])
        })
        .collect()
}

/// Observable state of a [`MemoryTarget`], shared with the test.
#[derive(Debug, Default)]
pub struct MemoryState {
    pub docs: BTreeMap<String, Document>,
    /// Collection size immediately before and after each write.
    pub writes: Vec<(u64, u64)>,
    /// Documents sent by each write, in order.
    pub payloads: Vec<Vec<Document>>,
    pub truncations: usize,
    pub cleaned_up: bool,
    pub closed: bool,
    next_id: u64,
}

/// A collection held in memory. Inserts assign fresh ids unless a document
/// carries its own `_id`, and reject duplicates; upserts replace by key.
pub struct MemoryTarget {
    name: String,
    state: Arc<Mutex<MemoryState>>,
    fail_on_write: Option<usize>,
}

impl MemoryTarget {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(MemoryState::default())),
            fail_on_write: None,
        }
    }

    /// Fails the `n`-th write (0-based) with a `WriteFailure`.
    pub fn failing_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    pub fn state(&self) -> Arc<Mutex<MemoryState>> {
        self.state.clone()
    }

    fn failure(&self, reason: impl Into<String>) -> BenchError {
        BenchError::WriteFailure {
            endpoint: self.name.clone(),
            reason: reason.into(),
        }
    }
}

fn key_string(key: &Bson) -> String {
    key.to_string()
}

#[async_trait]
impl WriteTarget for MemoryTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, payload: WritePayload) -> Result<(), BenchError> {
        let mut state = self.state.lock().map_err(|e| self.failure(e.to_string()))?;
        if self.fail_on_write == Some(state.writes.len()) {
            return Err(self.failure("injected write failure"));
        }
        let before = state.docs.len() as u64;

        let sent = match payload {
            WritePayload::Insert(docs) => {
                for doc in &docs {
                    let id = match doc.get("_id") {
                        Some(id) => id.clone(),
                        None => {
                            state.next_id += 1;
                            Bson::Int64(state.next_id as i64)
                        }
                    };
                    let key = key_string(&id);
                    if state.docs.contains_key(&key) {
                        return Err(BenchError::DuplicateKeyFailure {
                            endpoint: self.name.clone(),
                            reason: format!("E11000 duplicate key: _id {}", key),
                        });
                    }
                    let mut stored = doc.clone();
                    stored.insert("_id", id);
                    state.docs.insert(key, stored);
                }
                docs
            }
            WritePayload::Upsert(upserts) => {
                let mut sent = Vec::with_capacity(upserts.len());
                for Upsert { key, replacement } in upserts {
                    let mut stored = replacement.clone();
                    stored.insert("_id", key.clone());
                    state.docs.insert(key_string(&key), stored);
                    sent.push(replacement);
                }
                sent
            }
        };

        let after = state.docs.len() as u64;
        state.writes.push((before, after));
        state.payloads.push(sent);
        Ok(())
    }

    async fn count(&self) -> Result<u64, BenchError> {
        let state = self.state.lock().map_err(|e| self.failure(e.to_string()))?;
        Ok(state.docs.len() as u64)
    }

    async fn truncate(&mut self) -> Result<(), BenchError> {
        let mut state = self.state.lock().map_err(|e| self.failure(e.to_string()))?;
        state.docs.clear();
        state.truncations += 1;
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), BenchError> {
        let mut state = self.state.lock().map_err(|e| self.failure(e.to_string()))?;
        state.docs.clear();
        state.cleaned_up = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        let mut state = self.state.lock().map_err(|e| self.failure(e.to_string()))?;
        state.closed = true;
        Ok(())
    }
}

/// Hands out [`MemoryTarget`]s; endpoints named in `unreachable` fail their
/// liveness check.
#[derive(Default)]
pub struct MemoryConnector {
    unreachable: HashSet<String>,
    connected: Mutex<Vec<(String, Arc<Mutex<MemoryState>>)>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(mut self, name: &str) -> Self {
        self.unreachable.insert(name.to_string());
        self
    }

    /// State of every endpoint that connected successfully, in order.
    pub fn connected(&self) -> Vec<(String, Arc<Mutex<MemoryState>>)> {
        self.connected
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Target = MemoryTarget;

    async fn connect(
        &self,
        name: &str,
        _uri: &str,
        _target: &TargetConfig,
    ) -> Result<MemoryTarget, BenchError> {
        if self.unreachable.contains(name) {
            return Err(BenchError::ConnectionFailure {
                endpoint: name.to_string(),
                reason: "hello returned { ok: 0 }".to_string(),
            });
        }
        let target = MemoryTarget::new(name);
        if let Ok(mut connected) = self.connected.lock() {
            connected.push((name.to_string(), target.state()));
        }
        Ok(target)
    }
}
