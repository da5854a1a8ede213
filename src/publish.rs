//! Publishing the rendered page.
//!
//! The page is written as a single object: `text/html`, `public-read`,
//! keyed by the output name or the normalized title. [`ObjectStore`] is the
//! seam between the pipeline and the storage backend:
//!
//! - [`S3Store`]: an S3 bucket configured for static website hosting.
//! - [`DirectoryStore`]: a local directory, for previewing without uploading.
//! - [`MemoryStore`]: records puts in memory.

use crate::types::{PublishTarget, RenderedPage};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::cell::{OnceCell, RefCell};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload of s3://{bucket}/{key} failed: {message}")]
    S3 {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("object key {0:?} does not map to a file inside the output directory")]
    InvalidKey(String),
}

/// A blob store that accepts one object at a time.
pub trait ObjectStore {
    fn put_object(&self, target: &PublishTarget, body: &[u8]) -> Result<(), PublishError>;

    /// Human-readable location of `target` in this store, for reporting.
    fn describe(&self, target: &PublishTarget) -> String;
}

/// Object key for a page: `<name>.html`, where name is the explicit output
/// name if given, else the title with spaces replaced by underscores.
pub fn object_key(title: &str, output_name: Option<&str>) -> String {
    match output_name {
        Some(name) => format!("{name}.html"),
        None => format!("{}.html", title.replace(' ', "_")),
    }
}

/// Website redirect location for `--redirect <name>`.
///
/// Page names are turned into root-relative page paths. Values that already
/// look like a path or URL are kept as given.
pub fn redirect_location(name: &str) -> String {
    if name.starts_with('/') || name.starts_with("http://") || name.starts_with("https://") {
        name.to_string()
    } else {
        format!("/{}", object_key(name, None))
    }
}

/// Write `page` to `target` in `store`.
pub fn publish(
    store: &dyn ObjectStore,
    target: &PublishTarget,
    page: &RenderedPage,
) -> Result<(), PublishError> {
    store.put_object(target, page.as_bytes())?;
    info!(
        destination = %store.describe(target),
        bytes = page.len(),
        "published page"
    );
    Ok(())
}

// ============================================================================
// S3
// ============================================================================

/// S3 bucket backend. Credentials come from the standard AWS chain
/// (environment, shared config, instance profile).
///
/// The client is set up on the first put, so a dry run never resolves
/// credentials or region.
pub struct S3Store {
    region: Option<String>,
    connection: OnceCell<S3Connection>,
}

struct S3Connection {
    client: aws_sdk_s3::Client,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    pub fn new(region: Option<&str>) -> Self {
        Self {
            region: region.map(str::to_string),
            connection: OnceCell::new(),
        }
    }

    fn connection(&self) -> Result<&S3Connection, PublishError> {
        if let Some(connection) = self.connection.get() {
            return Ok(connection);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        let sdk_config = runtime.block_on(loader.load());
        let client = aws_sdk_s3::Client::new(&sdk_config);
        Ok(self
            .connection
            .get_or_init(|| S3Connection { client, runtime }))
    }
}

impl ObjectStore for S3Store {
    fn put_object(&self, target: &PublishTarget, body: &[u8]) -> Result<(), PublishError> {
        let connection = self.connection()?;
        let request = connection
            .client
            .put_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .body(ByteStream::from(body.to_vec()))
            .content_type(target.content_type)
            .acl(ObjectCannedAcl::from(target.acl.as_str()))
            .set_website_redirect_location(target.redirect.clone());

        connection
            .runtime
            .block_on(request.send())
            .map_err(|err| PublishError::S3 {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                message: DisplayErrorContext(err).to_string(),
            })?;
        Ok(())
    }

    fn describe(&self, target: &PublishTarget) -> String {
        format!("s3://{}/{}", target.bucket, target.key)
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Writes objects as files below a root directory. The bucket name is not
/// part of the path.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PublishError> {
        let relative = Path::new(key);
        let contained = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(PublishError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for DirectoryStore {
    fn put_object(&self, target: &PublishTarget, body: &[u8]) -> Result<(), PublishError> {
        let path = self.path_for(&target.key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        if let Some(location) = &target.redirect {
            warn!(%location, "redirects only apply to S3 website hosting; ignored");
        }
        Ok(())
    }

    fn describe(&self, target: &PublishTarget) -> String {
        self.root.join(&target.key).display().to_string()
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps every put in memory, in order.
#[derive(Default)]
pub struct MemoryStore {
    objects: RefCell<Vec<(PublishTarget, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All puts so far.
    pub fn objects(&self) -> Vec<(PublishTarget, Vec<u8>)> {
        self.objects.borrow().clone()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&self, target: &PublishTarget, body: &[u8]) -> Result<(), PublishError> {
        self.objects
            .borrow_mut()
            .push((target.clone(), body.to_vec()));
        Ok(())
    }

    fn describe(&self, target: &PublishTarget) -> String {
        format!("memory://{}/{}", target.bucket, target.key)
    }
}
