//! Adapters deriving Kubernetes child objects from a Tensorboard spec

pub mod deployment_builder;
pub mod logs_path;
pub mod scheduling;
pub mod service_builder;
pub mod virtual_service_builder;
