use std::fmt;
use std::str::FromStr;

use object_store::path::Path as ObjectPath;
use serde::{Deserialize, Serialize};

use crate::core::BenchError;

/// One monthly archive file, identified by year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchivePartition {
    pub year: i32,
    pub month: u32,
}

impl ArchivePartition {
    /// Panics if `month` is outside 1..=12.
    pub const fn new(year: i32, month: u32) -> Self {
        assert!(month >= 1 && month <= 12);
        Self { year, month }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Renders an object key template. `{year}` becomes the 4-digit year and
    /// `{month}` the zero-padded 2-digit month.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{year}", &format!("{:04}", self.year))
            .replace("{month}", &format!("{:02}", self.month))
    }

    /// Full object path for this partition under an optional prefix.
    pub fn object_path(&self, prefix: &str, template: &str) -> ObjectPath {
        let name = self.render(template);
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            ObjectPath::from(name)
        } else {
            ObjectPath::from(format!("{}/{}", prefix, name))
        }
    }
}

impl fmt::Display for ArchivePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ArchivePartition {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            BenchError::InvalidConfiguration(format!(
                "invalid archive partition '{}', expected YYYY-MM",
                s
            ))
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for ArchivePartition {
    type Error = BenchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArchivePartition> for String {
    fn from(partition: ArchivePartition) -> Self {
        partition.to_string()
    }
}

/// All partitions from `start` to `end` inclusive, oldest first.
pub fn partition_range(
    start: ArchivePartition,
    end: ArchivePartition,
) -> Result<Vec<ArchivePartition>, BenchError> {
    if end < start {
        return Err(BenchError::InvalidConfiguration(format!(
            "archive range ends ({}) before it starts ({})",
            end, start
        )));
    }
    let mut partitions = Vec::new();
    let mut current = start;
    while current <= end {
        partitions.push(current);
        current = current.next();
    }
    Ok(partitions)
}
