//! Istio VirtualService builder for Tensorboard routing
//!
//! VirtualService has no typed binding in k8s-openapi, so the route is
//! built as a `DynamicObject` against a hand-rolled `ApiResource`.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{ApiResource, DynamicObject};

use crate::adapters::service_builder::SERVICE_PORT;
use crate::crd::Tensorboard;

/// Istio gateway the Tensorboard route is attached to
pub const GATEWAY: &str = "kubeflow/kubeflow-gateway";
/// Route timeout for Tensorboard requests
pub const ROUTE_TIMEOUT: &str = "300s";

/// ApiResource describing `networking.istio.io/v1alpha3 VirtualService`
pub fn virtual_service_resource() -> ApiResource {
    ApiResource {
        group: "networking.istio.io".to_string(),
        version: "v1alpha3".to_string(),
        api_version: "networking.istio.io/v1alpha3".to_string(),
        kind: "VirtualService".to_string(),
        plural: "virtualservices".to_string(),
    }
}

/// Build the desired VirtualService for a Tensorboard resource.
///
/// Requests under `/tensorboard/<name>` are rewritten to `/` and routed to
/// the Tensorboard Service on its cluster-local DNS name.
pub fn build_virtual_service(tensorboard: &Tensorboard) -> DynamicObject {
    let name = tensorboard.metadata.name.clone().unwrap_or_default();
    let namespace = tensorboard.metadata.namespace.clone().unwrap_or_default();

    let prefix = format!("/tensorboard/{}", name);
    let host = format!("{}.{}.svc.cluster.local", name, namespace);

    let mut virtual_service = DynamicObject::new(&name, &virtual_service_resource());
    virtual_service.metadata.namespace = Some(namespace);
    virtual_service.metadata.owner_references = Some(vec![build_owner_reference(tensorboard)]);
    virtual_service.data = serde_json::json!({
        "spec": {
            "hosts": ["*"],
            "gateways": [GATEWAY],
            "http": [{
                "match": [{
                    "uri": {"prefix": prefix}
                }],
                "rewrite": {"uri": "/"},
                "route": [{
                    "destination": {
                        "host": host,
                        "port": {"number": SERVICE_PORT}
                    }
                }],
                "timeout": ROUTE_TIMEOUT
            }]
        }
    });

    virtual_service
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
