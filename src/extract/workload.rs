// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Supported workload kinds and where each keeps its pod spec

use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, PodSpec};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    Pod,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported resource type: {0}")]
pub struct WorkloadKindError(pub String);

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 6] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
        WorkloadKind::Job,
        WorkloadKind::CronJob,
        WorkloadKind::Pod,
    ];

    /// Kind as written in a manifest's `kind` field
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::Job => "Job",
            WorkloadKind::CronJob => "CronJob",
            WorkloadKind::Pod => "Pod",
        }
    }

    /// Exact, case-sensitive match on a manifest `kind`
    pub fn from_manifest_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            WorkloadKind::Deployment => &["deployment", "deployments", "deploy"],
            WorkloadKind::StatefulSet => &["statefulset", "statefulsets", "sts"],
            WorkloadKind::DaemonSet => &["daemonset", "daemonsets", "ds"],
            WorkloadKind::Job => &["job", "jobs"],
            WorkloadKind::CronJob => &["cronjob", "cronjobs", "cj"],
            WorkloadKind::Pod => &["pod", "pods", "po"],
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// kubectl-style resource type names: `deploy`, `sts`, `Pod`, `cronjobs`...
impl FromStr for WorkloadKind {
    type Err = WorkloadKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.aliases().contains(&lower.as_str()))
            .ok_or_else(|| WorkloadKindError(s.to_string()))
    }
}

/// A decoded workload object; one variant per supported kind
#[derive(Debug, Clone)]
pub enum Workload {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Job(Job),
    CronJob(CronJob),
    Pod(Pod),
}

impl Workload {
    /// Parse a JSON document into the typed object for `kind`
    pub fn from_value(kind: WorkloadKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            WorkloadKind::Deployment => Workload::Deployment(serde_json::from_value(value)?),
            WorkloadKind::StatefulSet => Workload::StatefulSet(serde_json::from_value(value)?),
            WorkloadKind::DaemonSet => Workload::DaemonSet(serde_json::from_value(value)?),
            WorkloadKind::Job => Workload::Job(serde_json::from_value(value)?),
            WorkloadKind::CronJob => Workload::CronJob(serde_json::from_value(value)?),
            WorkloadKind::Pod => Workload::Pod(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::Deployment(_) => WorkloadKind::Deployment,
            Workload::StatefulSet(_) => WorkloadKind::StatefulSet,
            Workload::DaemonSet(_) => WorkloadKind::DaemonSet,
            Workload::Job(_) => WorkloadKind::Job,
            Workload::CronJob(_) => WorkloadKind::CronJob,
            Workload::Pod(_) => WorkloadKind::Pod,
        }
    }

    pub fn name(&self) -> Option<&str> {
        let meta = match self {
            Workload::Deployment(o) => &o.metadata,
            Workload::StatefulSet(o) => &o.metadata,
            Workload::DaemonSet(o) => &o.metadata,
            Workload::Job(o) => &o.metadata,
            Workload::CronJob(o) => &o.metadata,
            Workload::Pod(o) => &o.metadata,
        };
        meta.name.as_deref()
    }

    /// The pod spec this workload runs, if the object carries one
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Workload::Deployment(o) => o.spec.as_ref()?.template.spec.as_ref(),
            Workload::StatefulSet(o) => o.spec.as_ref()?.template.spec.as_ref(),
            Workload::DaemonSet(o) => o.spec.as_ref()?.template.spec.as_ref(),
            Workload::Job(o) => o.spec.as_ref()?.template.spec.as_ref(),
            Workload::CronJob(o) => o
                .spec
                .as_ref()?
                .job_template
                .spec
                .as_ref()?
                .template
                .spec
                .as_ref(),
            Workload::Pod(o) => o.spec.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manifest_kind_is_case_sensitive() {
        assert_eq!(
            WorkloadKind::from_manifest_kind("Deployment"),
            Some(WorkloadKind::Deployment)
        );
        assert_eq!(WorkloadKind::from_manifest_kind("deployment"), None);
        assert_eq!(WorkloadKind::from_manifest_kind("Service"), None);
    }

    #[test]
    fn test_cli_aliases() {
        assert_eq!("deploy".parse::<WorkloadKind>(), Ok(WorkloadKind::Deployment));
        assert_eq!("Deployment".parse::<WorkloadKind>(), Ok(WorkloadKind::Deployment));
        assert_eq!("sts".parse::<WorkloadKind>(), Ok(WorkloadKind::StatefulSet));
        assert_eq!("ds".parse::<WorkloadKind>(), Ok(WorkloadKind::DaemonSet));
        assert_eq!("jobs".parse::<WorkloadKind>(), Ok(WorkloadKind::Job));
        assert_eq!("cj".parse::<WorkloadKind>(), Ok(WorkloadKind::CronJob));
        assert_eq!("po".parse::<WorkloadKind>(), Ok(WorkloadKind::Pod));
    }

    #[test]
    fn test_unknown_alias() {
        let err = "svc".parse::<WorkloadKind>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported resource type: svc");
    }

    #[test]
    fn test_cronjob_pod_spec_is_nested() {
        let value = json!({
            "apiVersion": "batch/v1",
            "kind": "CronJob",
            "metadata": {"name": "nightly"},
            "spec": {
                "schedule": "0 0 * * *",
                "jobTemplate": {"spec": {"template": {"spec": {
                    "containers": [{"name": "job", "image": "busybox"}]
                }}}}
            }
        });
        let workload = Workload::from_value(WorkloadKind::CronJob, value).unwrap();
        assert_eq!(workload.kind(), WorkloadKind::CronJob);
        assert_eq!(workload.name(), Some("nightly"));
        let spec = workload.pod_spec().unwrap();
        assert_eq!(spec.containers[0].name, "job");
    }

    #[test]
    fn test_workload_without_spec() {
        let value = json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "bare"}});
        let workload = Workload::from_value(WorkloadKind::Pod, value).unwrap();
        assert!(workload.pod_spec().is_none());
    }
}
