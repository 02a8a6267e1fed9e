use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    NewsImages,
    Templates,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::NewsImages => "news-images",
            Bucket::Templates => "templates",
        }
    }
}

/// Largest decoded upload accepted for either bucket.
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Request body cap for upload routes: base64 inflates by 4/3, plus the JSON envelope.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES / 3 * 4 + 64 * 1024;

/// Object keys are flat file names: no separators, no leading dot.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub fn decode_base64(content: &str) -> anyhow::Result<Vec<u8>> {
    // Browsers hand out data URLs; keep only the payload.
    let payload = match content.split_once(";base64,") {
        Some((_, data)) => data,
        None => content,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("invalid base64 upload")
}

/// Local-filesystem object storage with one directory per bucket.
pub struct ObjectStorage {
    root: PathBuf,
    public_url: String,
}

impl ObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory holding one bucket's objects; served under `/files/<bucket>`.
    pub fn dir(&self, bucket: Bucket) -> PathBuf {
        self.root.join(bucket.as_str())
    }

    fn object_path(&self, bucket: Bucket, key: &str) -> anyhow::Result<PathBuf> {
        if !is_valid_key(key) {
            anyhow::bail!("invalid object key: {key}");
        }
        Ok(self.dir(bucket).join(key))
    }

    /// Stores `bytes` under a fresh random key and returns the key.
    pub async fn put(&self, bucket: Bucket, extension: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let key = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        let path = self.object_path(bucket, &key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create bucket dir {}", dir.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write object {}", path.display()))?;
        tracing::info!(bucket = bucket.as_str(), key = %key, size = bytes.len(), "stored object");
        Ok(key)
    }

    pub async fn remove(&self, bucket: Bucket, key: &str) -> anyhow::Result<()> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove object {}", path.display())),
        }
    }

    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/files/{}/{}", self.public_url, bucket.as_str(), key)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
