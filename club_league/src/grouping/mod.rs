//! Partitioning of rating tiers into balanced player groups.

pub mod manager;
pub mod partition;

pub use manager::{GroupPartitioner, PartitionOrder, PartitionRequest};
pub use partition::{auto_group_name, partition_balanced};
