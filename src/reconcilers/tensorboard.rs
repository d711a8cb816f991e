//! Reconciliation logic for Tensorboard resources
//!
//! Each step derives one child object from the spec and server-side applies
//! it, so re-running any step is a no-op when cluster state already matches.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::{DynamicObject, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use tracing::info;

use crate::adapters::logs_path::LogStorage;
use crate::adapters::{deployment_builder, scheduling, service_builder, virtual_service_builder};
use crate::crd::{Tensorboard, TensorboardCondition};
use crate::{Error, Result};

/// Field manager used for server-side apply patches
pub const FIELD_MANAGER: &str = "tensorboard-operator";

/// Reconcile the Deployment running the Tensorboard server.
///
/// The node-affinity lookup is the one derivation step with a side effect:
/// when RWO PVC scheduling is enabled and the logs live on a PVC, it reads
/// the claim and the pods currently mounting it.
pub async fn reconcile_deployment(
    tensorboard: &Tensorboard,
    client: &Client,
    namespace: &str,
) -> Result<String> {
    let name = tensorboard.name_any();

    let storage = LogStorage::from_path(&tensorboard.spec.logs_path);
    let affinity = match &storage {
        LogStorage::Pvc { claim, .. } => {
            if scheduling::rwo_scheduling_enabled()? {
                scheduling::node_affinity_for_claim(client, namespace, claim).await?
            } else {
                None
            }
        }
        _ => None,
    };

    let deployment = deployment_builder::build_deployment(tensorboard, affinity);

    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let patch_params = PatchParams::apply(FIELD_MANAGER);

    deployments
        .patch(&name, &patch_params, &Patch::Apply(&deployment))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to create/update Deployment: {}", e)))?;

    info!("Reconciled Deployment {}/{}", namespace, name);

    Ok(name)
}

/// Reconcile the Service exposing the Tensorboard server
pub async fn reconcile_service(
    tensorboard: &Tensorboard,
    client: &Client,
    namespace: &str,
) -> Result<String> {
    let name = tensorboard.name_any();

    let service = service_builder::build_service(tensorboard);

    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let patch_params = PatchParams::apply(FIELD_MANAGER);

    services
        .patch(&name, &patch_params, &Patch::Apply(&service))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to create/update Service: {}", e)))?;

    info!("Reconciled Service {}/{}", namespace, name);

    Ok(name)
}

/// Reconcile the Istio VirtualService routing traffic to the Service
pub async fn reconcile_virtual_service(
    tensorboard: &Tensorboard,
    client: &Client,
    namespace: &str,
) -> Result<String> {
    let name = tensorboard.name_any();

    let virtual_service = virtual_service_builder::build_virtual_service(tensorboard);

    let virtual_services: Api<DynamicObject> = Api::namespaced_with(
        client.clone(),
        namespace,
        &virtual_service_builder::virtual_service_resource(),
    );
    let patch_params = PatchParams::apply(FIELD_MANAGER);

    virtual_services
        .patch(&name, &patch_params, &Patch::Apply(&virtual_service))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to create/update VirtualService: {}", e)))?;

    info!("Reconciled VirtualService {}/{}", namespace, name);

    Ok(name)
}

/// Update the Tensorboard status from the observed Deployment state.
///
/// Best effort on the re-fetch: a Deployment that disappeared between the
/// apply and this probe is logged and skipped, not an error. A new condition
/// is appended only when the Deployment state changed since the last one;
/// nothing is written otherwise.
pub async fn update_status(
    tensorboard: &Tensorboard,
    client: &Client,
    namespace: &str,
    deployment_name: &str,
) -> Result<()> {
    let name = tensorboard.name_any();

    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let deployment = match deployments.get(deployment_name).await {
        Ok(deployment) => deployment,
        Err(kube::Error::Api(e)) if e.code == 404 => {
            info!(
                "Deployment {}/{} not found, skipping status update",
                namespace, deployment_name
            );
            return Ok(());
        }
        Err(e) => {
            return Err(Error::KubeError(format!(
                "Failed to get Deployment {}: {}",
                deployment_name, e
            )))
        }
    };

    let Some(observed) = deployment
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.first())
    else {
        return Ok(());
    };

    let condition = TensorboardCondition {
        deployment_state: observed.type_.clone(),
        last_probe_time: observed.last_update_time.clone().map(|t| t.0),
    };

    let mut status = tensorboard.status.clone().unwrap_or_default();
    if !status.record(condition) {
        return Ok(());
    }

    let tensorboards: Api<Tensorboard> = Api::namespaced(client.clone(), namespace);
    let patch = serde_json::json!({ "status": &status });

    tensorboards
        .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to update status: {}", e)))?;

    info!(
        "Updated status for {}/{}: state={}",
        namespace,
        name,
        status
            .conditions
            .last()
            .map(|c| c.deployment_state.as_str())
            .unwrap_or_default()
    );

    Ok(())
}
