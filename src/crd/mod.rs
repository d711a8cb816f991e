//! Custom Resource Definitions for the Tensorboard Operator

mod tensorboard;

pub use tensorboard::*;

use kube::CustomResourceExt;

/// Generate CRD YAML manifests for all custom resources
pub fn generate_crds() -> Vec<String> {
    vec![serde_yaml::to_string(&Tensorboard::crd()).unwrap()]
}
