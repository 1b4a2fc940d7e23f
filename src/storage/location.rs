//! Storage locations (S3, R2, GCS, Azure, local, in-memory)

use super::glob::GlobPattern;
use crate::config::Credentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A root directory inside some object store
#[derive(Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: ObjectPath,
    /// URL scheme for display (s3, r2, gs, az, memory, file)
    scheme: String,
    /// Bucket/container name, empty for local and memory stores
    bucket: String,
}

impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

impl StorageLocation {
    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/`, `s3a://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible, needs an endpoint)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `memory://` - a fresh in-memory store
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    pub fn parse(location: &str, credentials: &Credentials) -> Result<Self> {
        let location = location.trim();
        let Some((scheme, _)) = location.split_once("://") else {
            return Self::parse_local(location);
        };

        match scheme {
            "s3" | "s3a" | "r2" => Self::parse_s3(location, credentials, scheme == "r2"),
            "gs" => Self::parse_gcs(location),
            "az" => Self::parse_azure(location),
            "memory" => Ok(Self::from_store(Arc::new(InMemory::new()), "memory", "")),
            "file" => {
                let url = Url::parse(location)?;
                let path = url
                    .to_file_path()
                    .map_err(|()| Error::storage_url(location, "not a valid file URL"))?;
                Self::parse_local(&path.to_string_lossy())
            }
            other => Err(Error::storage_url(
                location,
                format!("unsupported scheme '{other}'"),
            )),
        }
    }

    /// Wrap an existing store with a prefix
    pub fn from_store(store: Arc<dyn ObjectStore>, scheme: &str, prefix: &str) -> Self {
        Self {
            store,
            prefix: ObjectPath::from(prefix),
            scheme: scheme.to_string(),
            bucket: String::new(),
        }
    }

    /// Split `scheme://bucket/prefix` into bucket and decoded prefix
    fn bucket_and_prefix(location: &str) -> Result<(String, ObjectPath)> {
        let url = Url::parse(location)?;
        let bucket = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::storage_url(location, "missing bucket name"))?
            .to_string();
        let prefix = ObjectPath::from_url_path(url.path())?;
        Ok((bucket, prefix))
    }

    /// Parse S3 or R2 URL
    fn parse_s3(location: &str, credentials: &Credentials, is_r2: bool) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(location)?;
        let scheme = if is_r2 { "r2" } else { "s3" };

        let mut builder = AmazonS3Builder::new().with_bucket_name(&bucket);

        if let (Some(key_id), Some(secret)) = (
            credentials.access_key_id.as_deref(),
            credentials.secret_access_key.as_deref(),
        ) {
            builder = builder
                .with_access_key_id(key_id)
                .with_secret_access_key(secret);
        }
        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        builder = builder.with_region(credentials.region.as_deref().unwrap_or("us-west-2"));

        match &credentials.endpoint {
            Some(endpoint) => {
                builder = builder
                    .with_endpoint(endpoint)
                    .with_allow_http(endpoint.starts_with("http://"));
            }
            None if is_r2 => {
                return Err(Error::storage_url(
                    location,
                    "R2 locations need credentials.endpoint",
                ));
            }
            None => {}
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            bucket,
        })
    }

    /// Parse GCS URL
    fn parse_gcs(location: &str) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(location)?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            bucket,
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(location: &str) -> Result<Self> {
        let (container, prefix) = Self::bucket_and_prefix(location)?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(&container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            bucket: container,
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::storage_url(path, "empty path"));
        }

        // Create directory if it doesn't exist
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::default(),
            scheme: "file".to_string(),
            bucket: path.trim_end_matches('/').to_string(),
        })
    }

    /// Check if this is a cloud location (not local or memory)
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Get the scheme (s3, r2, gs, az, memory, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Human-readable URL of the root
    pub fn url(&self) -> String {
        self.display_key("")
    }

    /// Human-readable URL of a key relative to the root
    pub fn display_key(&self, key: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let prefix = self.prefix.as_ref();
        if !prefix.is_empty() {
            parts.push(prefix);
        }
        if !key.is_empty() {
            parts.push(key);
        }
        let joined = parts.join("/");
        match self.scheme.as_str() {
            "file" => format!("{}/{joined}", self.bucket),
            "memory" => format!("memory:///{joined}"),
            scheme => format!("{scheme}://{}/{joined}", self.bucket),
        }
    }

    /// Resolve a relative key against the root
    pub fn resolve(&self, key: &str) -> Result<ObjectPath> {
        let key = key.trim_matches('/');
        let full = match (self.prefix.as_ref().is_empty(), key.is_empty()) {
            (true, _) => key.to_string(),
            (false, true) => self.prefix.as_ref().to_string(),
            (false, false) => format!("{}/{key}", self.prefix.as_ref()),
        };
        Ok(ObjectPath::parse(full)?)
    }

    /// Strip the root prefix from a full object path
    fn relative_key(&self, path: &ObjectPath) -> Option<String> {
        let parts = path.prefix_match(&self.prefix)?;
        Some(parts.map(|p| p.as_ref().to_string()).collect::<Vec<_>>().join("/"))
    }

    /// List keys under `prefix` (relative), sorted
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let list_root = self.resolve(prefix)?;
        let listed = match self
            .store
            .list(Some(&list_root))
            .try_collect::<Vec<ObjectMeta>>()
            .await
        {
            Ok(listed) => listed,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut keys: Vec<String> = listed
            .iter()
            .filter_map(|meta| self.relative_key(&meta.location))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// List keys matching a glob, sorted
    pub async fn glob(&self, pattern: &GlobPattern) -> Result<Vec<String>> {
        let keys = self.list(pattern.list_prefix()).await?;
        Ok(keys.into_iter().filter(|k| pattern.matches(k)).collect())
    }

    /// Read a whole object
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.resolve(key)?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| Error::read(self.display_key(key), e.to_string()))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::read(self.display_key(key), e.to_string()))
    }

    /// Write bytes to a key, returning the full URL for logging
    pub async fn put(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.resolve(key)?;
        self.store.put(&path, data.into()).await?;
        Ok(self.display_key(key))
    }

    /// Delete every object under a relative directory
    pub async fn delete_dir(&self, dir: &str) -> Result<usize> {
        let keys = self.list(dir).await?;
        let dir = dir.trim_matches('/');
        let mut deleted = 0;
        for key in keys {
            // `list` matches whole segments, but guard against a sibling like `songs_v2`.
            if !(key == dir || key.starts_with(&format!("{dir}/"))) {
                continue;
            }
            let path = self.resolve(&key)?;
            match self.store.delete(&path).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => deleted += 1,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(deleted)
    }
}
