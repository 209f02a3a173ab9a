// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Fetching live workloads from the cluster

use anyhow::{Context, Result, anyhow};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use tracing::debug;

use super::client::get_with_retry;
use crate::extract::{Workload, WorkloadKind};

/// A workload named on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: String,
}

impl WorkloadRef {
    /// Accepts `TYPE/NAME` as one argument or `TYPE NAME` as two
    pub fn from_args(args: &[String]) -> Result<Self> {
        let (kind, name) = match args {
            [single] => single.split_once('/').ok_or_else(|| {
                anyhow!("invalid resource format '{}', expected TYPE/NAME", single)
            })?,
            [kind, name] => (kind.as_str(), name.as_str()),
            _ => return Err(anyhow!("expected TYPE/NAME or TYPE NAME")),
        };

        if name.is_empty() {
            return Err(anyhow!("resource name must not be empty"));
        }

        Ok(Self {
            kind: kind.parse()?,
            name: name.to_string(),
        })
    }
}

/// GET the workload from `namespace`
pub async fn fetch_workload(
    client: Client,
    namespace: &str,
    target: &WorkloadRef,
) -> Result<Workload> {
    debug!(kind = %target.kind, namespace = %namespace, name = %target.name, "Fetching workload");

    let name = target.name.as_str();
    let workload = match target.kind {
        WorkloadKind::Deployment => {
            let api: Api<Deployment> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::Deployment)
        }
        WorkloadKind::StatefulSet => {
            let api: Api<StatefulSet> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::StatefulSet)
        }
        WorkloadKind::DaemonSet => {
            let api: Api<DaemonSet> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::DaemonSet)
        }
        WorkloadKind::Job => {
            let api: Api<Job> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::Job)
        }
        WorkloadKind::CronJob => {
            let api: Api<CronJob> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::CronJob)
        }
        WorkloadKind::Pod => {
            let api: Api<Pod> = Api::namespaced(client, namespace);
            get_with_retry(&api, name).await.map(Workload::Pod)
        }
    };

    workload.with_context(|| {
        format!(
            "failed to get {} {} in namespace {}",
            target.kind.as_str().to_lowercase(),
            target.name,
            namespace
        )
    })
}
