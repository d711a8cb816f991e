//! Kubernetes Deployment builder for Tensorboard server pods

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Affinity, Container, ContainerPort, PersistentVolumeClaimVolumeSource, PodSpec,
    PodTemplateSpec, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use std::collections::BTreeMap;

use crate::adapters::logs_path::LogStorage;
use crate::crd::Tensorboard;

const IMAGE: &str = "tensorflow/tensorflow:2.1.0";
const COMMAND: &str = "/usr/local/bin/tensorboard";
const CONTAINER_PORT: i32 = 6006;

/// Volume name for PVC-backed log storage
pub const PVC_VOLUME_NAME: &str = "tbpd";
/// Volume name for the GCP credentials secret
pub const GCP_CREDS_VOLUME_NAME: &str = "gcp-creds";
/// Secret holding the GCP service account used to read `gs://` buckets
pub const GCP_CREDS_SECRET_NAME: &str = "user-gcp-sa";
/// Mount point of the GCP credentials secret
pub const GCP_CREDS_MOUNT_PATH: &str = "/secret/gcp";

/// Build the desired Deployment for a Tensorboard resource.
///
/// The volume layout follows the storage mode of `spec.logsPath`; the
/// optional affinity comes from the RWO PVC scheduling lookup and is only
/// ever set for PVC-backed storage.
pub fn build_deployment(tensorboard: &Tensorboard, affinity: Option<Affinity>) -> Deployment {
    let name = tensorboard.metadata.name.clone().unwrap_or_default();
    let namespace = tensorboard.metadata.namespace.clone().unwrap_or_default();
    let logs_path = &tensorboard.spec.logs_path;

    let storage = LogStorage::from_path(logs_path);
    let log_dir = storage.log_dir(logs_path).to_string();
    let (volumes, volume_mounts) = build_volumes(&storage);
    let labels = build_labels(&name);

    Deployment {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            owner_references: Some(vec![build_owner_reference(tensorboard)]),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    affinity,
                    restart_policy: Some("Always".to_string()),
                    containers: vec![Container {
                        name: "tensorboard".to_string(),
                        image: Some(IMAGE.to_string()),
                        image_pull_policy: Some("IfNotPresent".to_string()),
                        command: Some(vec![COMMAND.to_string()]),
                        working_dir: Some("/".to_string()),
                        args: Some(vec![format!("--logdir={}", log_dir)]),
                        ports: Some(vec![ContainerPort {
                            container_port: CONTAINER_PORT,
                            ..Default::default()
                        }]),
                        volume_mounts,
                        ..Default::default()
                    }],
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_volumes(storage: &LogStorage) -> (Option<Vec<Volume>>, Option<Vec<VolumeMount>>) {
    match storage {
        LogStorage::Pvc {
            claim,
            mount_path,
            sub_path,
        } => (
            Some(vec![Volume {
                name: PVC_VOLUME_NAME.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: claim.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            Some(vec![VolumeMount {
                name: PVC_VOLUME_NAME.to_string(),
                read_only: Some(true),
                mount_path: mount_path.clone(),
                sub_path: if sub_path.is_empty() {
                    None
                } else {
                    Some(sub_path.clone())
                },
                ..Default::default()
            }]),
        ),
        LogStorage::GoogleCloud => (
            Some(vec![Volume {
                name: GCP_CREDS_VOLUME_NAME.to_string(),
                secret: Some(SecretVolumeSource {
                    secret_name: Some(GCP_CREDS_SECRET_NAME.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            Some(vec![VolumeMount {
                name: GCP_CREDS_VOLUME_NAME.to_string(),
                read_only: Some(true),
                mount_path: GCP_CREDS_MOUNT_PATH.to_string(),
                ..Default::default()
            }]),
        ),
        // Non-Google cloud backends read the bucket directly and mount
        // nothing.
        LogStorage::Cloud => (None, None),
    }
}

fn build_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), name.to_string());
    labels
}

fn build_owner_reference(tensorboard: &Tensorboard) -> OwnerReference {
    OwnerReference {
        api_version: "tensorboard.kubeflow.org/v1alpha1".to_string(),
        kind: "Tensorboard".to_string(),
        name: tensorboard.metadata.name.clone().unwrap_or_default(),
        uid: tensorboard.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}
