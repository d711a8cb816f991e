//! Kubeflow Tensorboard Kubernetes Operator
//!
//! This operator manages Tensorboard server instances in Kubernetes using
//! Custom Resource Definitions (CRDs). For each Tensorboard resource it
//! derives and applies a Deployment, a Service and an Istio VirtualService.

pub mod adapters;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
