//! RWO PVC scheduling
//!
//! A ReadWriteOnce PVC can only be mounted by pods on a single node. When
//! the `RWO_PVC_SCHEDULING` feature is enabled and another pod already holds
//! the claim, the Tensorboard pod gets a preferred node-affinity term for
//! that pod's node so both can share the volume.

use k8s_openapi::api::core::v1::{
    Affinity, NodeAffinity, NodeSelectorRequirement, NodeSelectorTerm, PersistentVolumeClaim, Pod,
    PreferredSchedulingTerm,
};
use kube::api::ListParams;
use kube::{Api, Client};

use crate::{Error, Result};

/// Environment variable gating the RWO PVC scheduling feature
pub const RWO_PVC_SCHEDULING_ENV: &str = "RWO_PVC_SCHEDULING";

/// Check whether RWO PVC scheduling is enabled.
///
/// Accepted values: `true`/`True`/`TRUE` enable, `false`/`False`/`FALSE` or
/// an unset variable disable. Anything else is a configuration error.
pub fn rwo_scheduling_enabled() -> Result<bool> {
    match std::env::var(RWO_PVC_SCHEDULING_ENV) {
        Ok(value) => match value.as_str() {
            "true" | "True" | "TRUE" => Ok(true),
            "false" | "False" | "FALSE" => Ok(false),
            other => Err(Error::ConfigError(format!(
                "Invalid value '{}' for '{}' env var",
                other, RWO_PVC_SCHEDULING_ENV
            ))),
        },
        Err(std::env::VarError::NotPresent) => Ok(false),
        Err(e) => Err(Error::ConfigError(format!(
            "Failed to read '{}' env var: {}",
            RWO_PVC_SCHEDULING_ENV, e
        ))),
    }
}

/// Compute a node affinity co-locating the Tensorboard pod with whatever pod
/// already mounts the claim.
///
/// Returns `None` when the claim is not ReadWriteOnce, no pod using it is
/// running, or the running pod is not bound to a node yet.
pub async fn node_affinity_for_claim(
    client: &Client,
    namespace: &str,
    claim: &str,
) -> Result<Option<Affinity>> {
    let pvcs: Api<PersistentVolumeClaim> = Api::namespaced(client.clone(), namespace);
    let pvc = pvcs
        .get(claim)
        .await
        .map_err(|e| Error::KubeError(format!("Failed to get PersistentVolumeClaim {}: {}", claim, e)))?;

    let read_write_once = pvc
        .status
        .as_ref()
        .and_then(|s| s.access_modes.as_ref())
        .and_then(|modes| modes.first())
        .is_some_and(|mode| mode.as_str() == "ReadWriteOnce");
    if !read_write_once {
        return Ok(None);
    }

    // Pods cannot be filtered by claim name server-side (only a fixed set
    // of pod field selectors exists), so list the namespace and filter
    // locally.
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod_list = pods
        .list(&ListParams::default())
        .await
        .map_err(|e| Error::KubeError(format!("Failed to list pods in {}: {}", namespace, e)))?;

    let claim_pods: Vec<Pod> = pod_list
        .items
        .into_iter()
        .filter(|pod| mounts_claim(pod, claim))
        .collect();

    Ok(find_running_pod(&claim_pods)
        .and_then(|pod| pod.spec.as_ref().and_then(|s| s.node_name.clone()))
        .map(|node| preferred_node_affinity(&node)))
}

/// Whether any of the pod's volumes is backed by the given PVC claim
pub fn mounts_claim(pod: &Pod, claim: &str) -> bool {
    pod.spec
        .as_ref()
        .and_then(|s| s.volumes.as_ref())
        .is_some_and(|volumes| {
            volumes.iter().any(|volume| {
                volume
                    .persistent_volume_claim
                    .as_ref()
                    .is_some_and(|source| source.claim_name == claim)
            })
        })
}

/// First running pod in the list, if any. List order is whatever the API
/// server returned; no tie-break among multiple running pods.
pub fn find_running_pod(pods: &[Pod]) -> Option<&Pod> {
    pods.iter()
        .find(|pod| pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running"))
}

/// A single soft affinity term preferring the given node, weight 100
pub fn preferred_node_affinity(node_name: &str) -> Affinity {
    Affinity {
        node_affinity: Some(NodeAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                PreferredSchedulingTerm {
                    weight: 100,
                    preference: NodeSelectorTerm {
                        match_expressions: Some(vec![NodeSelectorRequirement {
                            key: "kubernetes.io/hostname".to_string(),
                            operator: "In".to_string(),
                            values: Some(vec![node_name.to_string()]),
                        }]),
                        ..Default::default()
                    },
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
