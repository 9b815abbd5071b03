use std::io::{Cursor, Read};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampMillisecondType};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::DateTime;
use zip::ZipArchive;

use crate::core::{BenchError, FieldValue, SampleRecord};

const CSV_BATCH_SIZE: usize = 8192;

/// Upper bound on the buffer reserved from a zip entry's declared size.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Decodes one fetched archive object into records.
///
/// `.zip` objects are unpacked and every CSV entry is decoded in archive
/// order; anything else is treated as a bare CSV file.
pub fn decode_partition(name: &str, data: Bytes) -> Result<Vec<SampleRecord>, BenchError> {
    if name.to_ascii_lowercase().ends_with(".zip") {
        decode_zip(name, data)
    } else {
        decode_csv(&data)
    }
}

fn decode_zip(name: &str, data: Bytes) -> Result<Vec<SampleRecord>, BenchError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut records = Vec::new();
    let mut entries = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        if entry.is_dir()
            || entry_name.starts_with("__MACOSX/")
            || !entry_name.to_ascii_lowercase().ends_with(".csv")
        {
            continue;
        }

        let mut buf = Vec::with_capacity(capacity_hint(entry.size()));
        entry.read_to_end(&mut buf)?;
        let decoded = decode_csv(&buf)?;
        log::debug!("{}: entry '{}' has {} rows", name, entry_name, decoded.len());
        records.extend(decoded);
        entries += 1;
    }

    if entries == 0 {
        return Err(BenchError::AcquisitionFailure(format!(
            "archive '{}' contains no CSV entries",
            name
        )));
    }
    Ok(records)
}

/// Preallocation for an entry, trusting its declared size only up to a cap.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Decodes a CSV file with a header row, inferring column types from the data.
pub fn decode_csv(data: &[u8]) -> Result<Vec<SampleRecord>, BenchError> {
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(Cursor::new(data), None)?;
    if schema.fields().is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<Arc<str>> = schema
        .fields()
        .iter()
        .map(|f| Arc::from(f.name().as_str()))
        .collect();

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_batch_size(CSV_BATCH_SIZE)
        .build(Cursor::new(data))?;

    let mut records = Vec::new();
    for batch in reader {
        append_batch(&batch?, &names, &mut records)?;
    }
    Ok(records)
}

/// Narrows a column to one of the shapes `cell` understands.
fn normalize(column: &ArrayRef) -> Result<ArrayRef, BenchError> {
    let target = match column.data_type() {
        DataType::Null | DataType::Boolean | DataType::Int64 | DataType::Float64 | DataType::Utf8 => {
            return Ok(column.clone());
        }
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            DataType::Timestamp(TimeUnit::Millisecond, None)
        }
        t if t.is_integer() => DataType::Int64,
        t if t.is_floating() => DataType::Float64,
        _ => DataType::Utf8,
    };
    Ok(cast(column, &target)?)
}

fn cell(column: &ArrayRef, row: usize) -> FieldValue {
    if column.is_null(row) {
        return FieldValue::Null;
    }
    match column.data_type() {
        DataType::Boolean => FieldValue::Bool(column.as_boolean().value(row)),
        DataType::Int64 => FieldValue::Int(column.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => FieldValue::Float(column.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => FieldValue::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let millis = column.as_primitive::<TimestampMillisecondType>().value(row);
            match DateTime::from_timestamp_millis(millis) {
                Some(ts) => FieldValue::Timestamp(ts.naive_utc()),
                None => FieldValue::Null,
            }
        }
        _ => FieldValue::Null,
    }
}

fn append_batch(
    batch: &RecordBatch,
    names: &[Arc<str>],
    out: &mut Vec<SampleRecord>,
) -> Result<(), BenchError> {
    let columns = batch
        .columns()
        .iter()
        .map(normalize)
        .collect::<Result<Vec<_>, _>>()?;

    out.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut record = SampleRecord::with_capacity(columns.len());
        for (name, column) in names.iter().zip(&columns) {
            record.push(name.clone(), cell(column, row));
        }
        out.push(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const TRIPS: &str = "\
tripduration,starttime,start station name,start station latitude,bikeid,usertype,birth year
680,2017-01-01 00:00:21,W 82 St & Central Park West,40.78275,25542,Subscriber,1965
1282,2017-01-01 00:00:45,Cooper Square & E 7 St,40.72923649,21136,Customer,
";

    #[test]
    fn test_capacity_hint_caps_declared_size() {
        assert_eq!(capacity_hint(1024), 1024);
        assert_eq!(capacity_hint(u64::MAX), MAX_PREALLOC as usize);
    }

    fn zipped(entries: &[(&str, &str)]) -> Bytes {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        Bytes::from(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_decode_csv_types() {
        let records = decode_csv(TRIPS.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.get("tripduration"), Some(&FieldValue::Int(680)));
        assert_eq!(
            first.get("starttime"),
            Some(&FieldValue::Timestamp(
                NaiveDate::from_ymd_opt(2017, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 21)
                    .unwrap()
            ))
        );
        assert_eq!(
            first.get("start station latitude"),
            Some(&FieldValue::Float(40.78275))
        );
        assert_eq!(
            first.get("usertype"),
            Some(&FieldValue::Text("Subscriber".to_string()))
        );
        assert_eq!(first.get("birth year"), Some(&FieldValue::Int(1965)));
        assert_eq!(records[1].get("birth year"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_decode_csv_keeps_column_order() {
        let records = decode_csv(TRIPS.as_bytes()).unwrap();
        let names: Vec<&str> = records[0].iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "tripduration");
        assert_eq!(names[6], "birth year");
    }

    #[test]
    fn test_decode_header_only() {
        let records = decode_csv(b"a,b,c\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_zip_all_csv_entries() {
        let data = zipped(&[
            ("201701-citibike-tripdata.csv", TRIPS),
            ("__MACOSX/._201701-citibike-tripdata.csv", "junk"),
            ("README.txt", "not data"),
            ("part2.csv", TRIPS),
        ]);
        let records = decode_partition("201701-citibike-tripdata.csv.zip", data).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_decode_zip_without_csv() {
        let data = zipped(&[("README.txt", "nothing here")]);
        let result = decode_partition("x.zip", data);
        assert!(matches!(result, Err(BenchError::AcquisitionFailure(_))));
    }

    #[test]
    fn test_decode_corrupt_zip() {
        let result = decode_partition("x.zip", Bytes::from_static(b"not a zip"));
        assert!(matches!(result, Err(BenchError::AcquisitionFailure(_))));
    }

    #[test]
    fn test_decode_plain_csv_object() {
        let records = decode_partition("201701.csv", Bytes::from_static(TRIPS.as_bytes())).unwrap();
        assert_eq!(records.len(), 2);
    }
}
