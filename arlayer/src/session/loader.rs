//! Asset preparation.
//!
//! An [`AssetLoader`] turns a [`ModelDescriptor`] into a [`PreparedAsset`]
//! before the model is committed to the registry. Preparation runs on the
//! runtime without holding any session lock, so it may take as long as the
//! asset pipeline needs. It must observe the cancellation token it is given.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::DEFAULT_LARGE_ASSET_BYTES;
use crate::model::{AssetFormat, ModelDescriptor, PreparedAsset};

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors raised while preparing an asset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file does not exist.
    #[error("source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source is not a format the engine can render.
    #[error("unsupported asset format {format} for {}", path.display())]
    UnsupportedFormat { format: AssetFormat, path: PathBuf },

    /// The source path is not a regular file.
    #[error("source is not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// Reading file metadata failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cancellation token fired before preparation finished.
    #[error("load cancelled")]
    Cancelled,
}

/// Source of prepared assets.
///
/// Implementations must be cheap to share; the session holds one behind an
/// `Arc` and calls it from spawned tasks.
pub trait AssetLoader: Send + Sync + 'static {
    /// Prepare the asset for `descriptor`.
    ///
    /// Implementations return [`LoadError::Cancelled`] promptly once
    /// `cancel` fires.
    fn prepare<'a>(
        &'a self,
        descriptor: &'a ModelDescriptor,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<PreparedAsset, LoadError>>;
}

/// Accepts every descriptor without touching the filesystem.
///
/// Used when the asset pipeline lives elsewhere and paths are opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughLoader;

impl AssetLoader for PassthroughLoader {
    fn prepare<'a>(
        &'a self,
        descriptor: &'a ModelDescriptor,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<PreparedAsset, LoadError>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(LoadError::Cancelled);
            }
            Ok(PreparedAsset {
                byte_size: 0,
                format: descriptor.format(),
            })
        })
    }
}

/// Verifies the source file on disk before accepting it.
///
/// Rejects missing files, directories, and formats other than glTF/GLB.
#[derive(Debug, Clone, Copy)]
pub struct FileAssetLoader {
    large_asset_bytes: u64,
}

impl Default for FileAssetLoader {
    fn default() -> Self {
        Self::new(DEFAULT_LARGE_ASSET_BYTES)
    }
}

impl FileAssetLoader {
    /// Create a loader that reports assets above `large_asset_bytes` as
    /// progressive loads.
    pub fn new(large_asset_bytes: u64) -> Self {
        Self { large_asset_bytes }
    }

    async fn inspect(&self, descriptor: &ModelDescriptor) -> Result<PreparedAsset, LoadError> {
        let path = PathBuf::from(&descriptor.source_path);
        let format = AssetFormat::from_path(&path);
        if !format.is_engine_ready() {
            return Err(LoadError::UnsupportedFormat { format, path });
        }

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound { path });
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        if !metadata.is_file() {
            return Err(LoadError::NotAFile { path });
        }

        if metadata.len() > self.large_asset_bytes {
            info!(
                model_id = %descriptor.id,
                bytes = metadata.len(),
                threshold = self.large_asset_bytes,
                "Large asset, loading progressively"
            );
        } else {
            debug!(
                model_id = %descriptor.id,
                path = %path.display(),
                bytes = metadata.len(),
                "Asset verified"
            );
        }

        Ok(PreparedAsset {
            byte_size: metadata.len(),
            format,
        })
    }
}

impl AssetLoader for FileAssetLoader {
    fn prepare<'a>(
        &'a self,
        descriptor: &'a ModelDescriptor,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<PreparedAsset, LoadError>> {
        Box::pin(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(LoadError::Cancelled),
                result = self.inspect(descriptor) => result,
            }
        })
    }
}
