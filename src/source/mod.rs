mod acquire;
mod archive;
mod decode;
mod partition;
mod sample;
mod store;

pub use acquire::{Acquired, AcquisitionResult, acquire};
pub use archive::{ArchiveSource, ObjectStoreArchive};
pub use decode::{decode_csv, decode_partition};
pub use partition::{ArchivePartition, partition_range};
pub use sample::{SampleBatch, SamplePool};
