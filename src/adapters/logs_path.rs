//! Log storage path grammar
//!
//! A Tensorboard `logsPath` selects exactly one storage mode, decided by
//! prefix matching in priority order: Google cloud (`gs://`), other cloud
//! (`s3://`, `/cns/`), explicit PVC (`pvc://`), and finally the legacy PVC
//! convention for any other path.

const GCS_PREFIX: &str = "gs://";
const S3_PREFIX: &str = "s3://";
const CNS_PREFIX: &str = "/cns/";
const PVC_PREFIX: &str = "pvc://";

/// Claim name used for paths that predate the `pvc://` convention
pub const LEGACY_CLAIM_NAME: &str = "tb-volume";

/// Mount point inside the Tensorboard container for `pvc://` claims
pub const PVC_MOUNT_PATH: &str = "/tensorboard_logs/";

/// Resolved storage mode for a Tensorboard `logsPath`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogStorage {
    /// Google cloud bucket; credentials come from a mounted secret
    GoogleCloud,
    /// Non-Google cloud storage (`s3://`, `/cns/`); no volumes are derived
    Cloud,
    /// PVC-backed storage, either explicit (`pvc://`) or legacy
    Pvc {
        /// PVC claim name to mount
        claim: String,
        /// Mount path inside the container
        mount_path: String,
        /// Sub-path within the claim, empty when mounting the claim root
        sub_path: String,
    },
}

impl LogStorage {
    /// Resolve the storage mode for a logs path
    pub fn from_path(path: &str) -> Self {
        if is_google_cloud_path(path) {
            LogStorage::GoogleCloud
        } else if is_cloud_path(path) {
            LogStorage::Cloud
        } else if is_pvc_path(path) {
            LogStorage::Pvc {
                claim: extract_pvc_name(path),
                mount_path: PVC_MOUNT_PATH.to_string(),
                sub_path: extract_pvc_sub_path(path),
            }
        } else {
            // Backwards compatibility with the original controller: any
            // non-cloud path mounts the fixed tb-volume claim at the path
            // itself.
            LogStorage::Pvc {
                claim: LEGACY_CLAIM_NAME.to_string(),
                mount_path: path.to_string(),
                sub_path: String::new(),
            }
        }
    }

    /// Directory the Tensorboard server reads logs from (`--logdir` value)
    pub fn log_dir<'a>(&'a self, logs_path: &'a str) -> &'a str {
        match self {
            LogStorage::Pvc { mount_path, .. } => mount_path,
            _ => logs_path,
        }
    }
}

/// Whether the path refers to any cloud storage backend
pub fn is_cloud_path(path: &str) -> bool {
    is_google_cloud_path(path) || path.starts_with(S3_PREFIX) || path.starts_with(CNS_PREFIX)
}

/// Whether the path refers to a Google cloud bucket
pub fn is_google_cloud_path(path: &str) -> bool {
    path.starts_with(GCS_PREFIX)
}

/// Whether the path uses the explicit `pvc://<name>/<sub-path>` form
pub fn is_pvc_path(path: &str) -> bool {
    path.starts_with(PVC_PREFIX)
}

/// Extract the claim name from a `pvc://` path: everything up to the first
/// `/` after the prefix, or the whole remainder if there is none.
pub fn extract_pvc_name(path: &str) -> String {
    let trimmed = path.strip_prefix(PVC_PREFIX).unwrap_or(path);
    match trimmed.find('/') {
        Some(end) => trimmed[..end].to_string(),
        None => trimmed.to_string(),
    }
}

/// Extract the sub-path from a `pvc://` path: everything after the first `/`
/// following the prefix. Empty when there is no `/` or it is the last
/// character.
pub fn extract_pvc_sub_path(path: &str) -> String {
    let trimmed = path.strip_prefix(PVC_PREFIX).unwrap_or(path);
    match trimmed.find('/') {
        Some(start) if start + 1 < trimmed.len() => trimmed[start + 1..].to_string(),
        _ => String::new(),
    }
}
