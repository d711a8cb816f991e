//! Tensorboard Custom Resource Definition

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tensorboard resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "tensorboard.kubeflow.org",
    version = "v1alpha1",
    kind = "Tensorboard",
    plural = "tensorboards",
    singular = "tensorboard",
    shortname = "tb",
    namespaced,
    status = "TensorboardStatus",
    printcolumn = r#"{"name": "Logs Path", "type": "string", "jsonPath": ".spec.logsPath"}"#,
    printcolumn = r#"{"name": "State", "type": "string", "jsonPath": ".status.conditions[-1:].deploymentState"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardSpec {
    /// Location of the event logs served by the Tensorboard instance.
    ///
    /// Accepted forms:
    /// - `pvc://<claim-name>/<sub-path>` mounts the named PVC
    /// - a cloud bucket path (`gs://`, `s3://`, `/cns/`)
    /// - any other path mounts the legacy `tb-volume` claim
    pub logs_path: String,
}

/// Tensorboard status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardStatus {
    /// History of observed Deployment states, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<TensorboardCondition>,
}

impl TensorboardStatus {
    /// Append a condition unless its state matches the most recent entry.
    ///
    /// Returns true when the condition was appended. Conditions are never
    /// mutated or reordered, only appended.
    pub fn record(&mut self, condition: TensorboardCondition) -> bool {
        match self.conditions.last() {
            Some(last) if last.deployment_state == condition.deployment_state => false,
            _ => {
                self.conditions.push(condition);
                true
            }
        }
    }
}

/// Observed state of the Tensorboard Deployment at a point in time
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardCondition {
    /// Condition type of the underlying Deployment (Available, Progressing, ...)
    pub deployment_state: String,

    /// Last update time reported by the Deployment condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<DateTime<Utc>>,
}
