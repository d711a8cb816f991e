//! Reconciliation steps converging cluster state toward a Tensorboard spec

pub mod tensorboard;
