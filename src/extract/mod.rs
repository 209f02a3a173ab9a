mod manifest;
mod pod_spec;
mod record;
mod workload;

pub use manifest::{ManifestError, decode_manifests};
pub use pod_spec::extract_pod_spec;
pub use record::{EnvSource, EnvVar, KeyRef};
pub use workload::{Workload, WorkloadKind};
