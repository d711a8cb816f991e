//! Controller for Tensorboard resources

use futures::StreamExt;
use kube::{
    runtime::{
        controller::{Action, Controller},
        watcher::Config,
    },
    Api, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::controllers::Context;
use crate::crd::Tensorboard;
use crate::metrics::prometheus::{RECONCILE_DURATION, RECONCILIATIONS, RECONCILIATION_ERRORS};
use crate::reconcilers::tensorboard;
use crate::Error;

/// Resync interval after a successful reconcile
const REQUEUE_INTERVAL: Duration = Duration::from_secs(30);

/// Run the Tensorboard controller
pub async fn run(ctx: Arc<Context>) {
    let client = ctx.client.clone();
    let tensorboards: Api<Tensorboard> = Api::all(client.clone());

    info!("Starting Tensorboard controller");

    Controller::new(tensorboards, Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok(o) => info!("Reconciled {:?}", o),
                Err(e) => error!("Reconcile failed: {:?}", e),
            }
        })
        .await;

    info!("Tensorboard controller stopped");
}

/// Reconcile a Tensorboard resource
#[instrument(skip(tensorboard, ctx), fields(name = %tensorboard.name_any(), namespace = tensorboard.namespace().unwrap_or_default()))]
pub async fn reconcile(tensorboard: Arc<Tensorboard>, ctx: Arc<Context>) -> Result<Action, Error> {
    let start = std::time::Instant::now();
    let ns = tensorboard.namespace().unwrap_or_default();
    let name = tensorboard.name_any();

    RECONCILIATIONS.with_label_values(&["Tensorboard"]).inc();

    // Re-fetch by identity. A 404 here means the resource was deleted
    // between event delivery and this reconcile; children are garbage
    // collected through owner references, so there is nothing to do.
    let tensorboards: Api<Tensorboard> = Api::namespaced(ctx.client.clone(), &ns);
    let tensorboard = match tensorboards.get(&name).await {
        Ok(tensorboard) => tensorboard,
        Err(kube::Error::Api(e)) if e.code == 404 => {
            info!("Tensorboard {}/{} no longer exists, nothing to do", ns, name);
            return Ok(Action::await_change());
        }
        Err(e) => {
            return Err(Error::KubeError(format!(
                "Failed to get Tensorboard {}/{}: {}",
                ns, name, e
            )))
        }
    };

    let result = apply(&tensorboard, &ctx).await;

    let duration = start.elapsed().as_secs_f64();
    RECONCILE_DURATION
        .with_label_values(&["Tensorboard"])
        .observe(duration);

    match &result {
        Ok(_) => info!("Successfully reconciled {}/{} in {:.2}s", ns, name, duration),
        Err(e) => {
            RECONCILIATION_ERRORS
                .with_label_values(&["Tensorboard"])
                .inc();
            error!("Failed to reconcile {}/{}: {:?}", ns, name, e);
        }
    }

    result
}

/// Apply changes for a Tensorboard, strictly in the order
/// Deployment, Service, VirtualService, status update.
async fn apply(tensorboard: &Tensorboard, ctx: &Context) -> Result<Action, Error> {
    let ns = tensorboard.namespace().unwrap_or_default();
    let name = tensorboard.name_any();

    info!("Applying Tensorboard {}/{}", ns, name);

    let deployment_name = tensorboard::reconcile_deployment(tensorboard, &ctx.client, &ns).await?;

    tensorboard::reconcile_service(tensorboard, &ctx.client, &ns).await?;

    tensorboard::reconcile_virtual_service(tensorboard, &ctx.client, &ns).await?;

    tensorboard::update_status(tensorboard, &ctx.client, &ns, &deployment_name).await?;

    // Requeue to keep tracking the Deployment state
    Ok(Action::requeue(REQUEUE_INTERVAL))
}

/// Error policy for the controller
fn error_policy(tensorboard: Arc<Tensorboard>, err: &Error, _ctx: Arc<Context>) -> Action {
    let ns = tensorboard.namespace().unwrap_or_default();
    let name = tensorboard.name_any();

    error!("Reconciliation error for {}/{}: {:?}", ns, name, err);

    // Requeue with backoff based on error type; config errors need operator
    // intervention and retry much later
    match err {
        Error::KubeError(_) => Action::requeue(Duration::from_secs(30)),
        Error::ConfigError(_) => Action::requeue(Duration::from_secs(300)),
    }
}
