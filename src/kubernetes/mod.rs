mod client;
mod store;
mod workload;

pub use client::ClusterClient;
#[cfg(test)]
pub use store::memory::MemoryStore;
pub use store::{KeyValueStore, KubeStore, ObjectData};
pub use workload::{WorkloadRef, fetch_workload};
