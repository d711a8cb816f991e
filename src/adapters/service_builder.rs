//! Kubernetes Service builder for Tensorboard access

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

use crate::crd::Tensorboard;

/// Port exposed by the Service, routed to the Tensorboard container
pub const SERVICE_PORT: i32 = 9000;
/// Port the Tensorboard container listens on
pub const TARGET_PORT: i32 = 6006;

/// Build the desired Service for a Tensorboard resource
pub fn build_service(tensorboard: &Tensorboard) -> Service {
    let name = tensorboard.metadata.name.clone().unwrap_or_default();
    let namespace = tensorboard.metadata.namespace.clone().unwrap_or_default();

    let mut selector = BTreeMap::new();
    selector.insert("app".to_string(), name.clone());

    Service {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace),
            owner_references: Some(vec![build_owner_reference(tensorboard)]),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(selector),
            ports: Some(vec![ServicePort {
                name: Some(format!("http-{}", name)),
                port: SERVICE_PORT,
                target_port: Some(IntOrString::Int(TARGET_PORT)),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
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
