//! Content host abstraction for the hosted file API.
//!
//! The remote store talks to its backing file through the [`ContentHost`]
//! trait so the real HTTP implementation can be swapped for an in-memory
//! double in tests. Hosts deal in transport-encoded payloads only; the
//! store owns serialization and merge semantics.

use crate::error::{RemoteError, RemoteResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// The remote file as returned by the contents endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Base64-encoded file content. Hosts may insert line breaks.
    pub content: String,
    /// Opaque revision token (content hash) of the current file version.
    pub sha: String,
}

/// A conditional write of the whole file.
#[derive(Debug, Clone, Serialize)]
pub struct PutPayload {
    /// Commit message recorded by the host.
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    /// Revision token the write is conditioned on. `None` only for the
    /// first write, when the file does not exist yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// A host that stores a single versioned file.
///
/// Implementations must enforce optimistic concurrency: a [`PutPayload`]
/// whose `sha` does not match the current file revision is rejected with
/// [`RemoteError::Conflict`], converting a would-be silent overwrite into
/// an explicit, retryable failure.
pub trait ContentHost: Send + Sync {
    /// Fetches the current file, or `None` if it does not exist.
    fn fetch(&self) -> RemoteResult<Option<RemoteFile>>;

    /// Writes the file conditioned on the payload's revision token.
    ///
    /// Returns the new revision token on success.
    fn store(&self, payload: &PutPayload) -> RemoteResult<String>;
}

// Lets several stores share one host, e.g. two devices in a test.
impl<H: ContentHost + ?Sized> ContentHost for std::sync::Arc<H> {
    fn fetch(&self) -> RemoteResult<Option<RemoteFile>> {
        (**self).fetch()
    }

    fn store(&self, payload: &PutPayload) -> RemoteResult<String> {
        (**self).store(payload)
    }
}

struct StoredFile {
    content: String,
    sha: String,
}

/// An in-memory content host for tests and ephemeral use.
///
/// Mimics the hosted API's concurrency rules: updating an existing file
/// requires the current sha, creating a fresh file requires no sha, and
/// anything else is a conflict. Fetched content is line-wrapped the way
/// the real host chunks base64. Call counters and injectable failures
/// support the sync-engine test scenarios.
#[derive(Default)]
pub struct MemoryHost {
    file: Mutex<Option<StoredFile>>,
    next_sha: AtomicU64,
    fetch_calls: AtomicUsize,
    store_calls: AtomicUsize,
    fail_next_fetch: Mutex<Option<String>>,
    fail_next_store: Mutex<Option<String>>,
}

impl MemoryHost {
    /// Creates an empty host (no file yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the hosted file with the given raw content, minting a new sha.
    pub fn seed(&self, content: &str) {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        *self.file.lock() = Some(StoredFile {
            content: encoded,
            sha: self.mint_sha(),
        });
    }

    /// Returns the current revision token, if the file exists.
    #[must_use]
    pub fn sha(&self) -> Option<String> {
        self.file.lock().as_ref().map(|f| f.sha.clone())
    }

    /// Returns the decoded raw content of the hosted file, if any.
    #[must_use]
    pub fn raw_content(&self) -> Option<String> {
        use base64::Engine as _;
        self.file.lock().as_ref().map(|f| {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(f.content.as_bytes())
                .expect("memory host holds valid base64");
            String::from_utf8(bytes).expect("memory host holds valid utf-8")
        })
    }

    /// Number of fetches performed.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of writes attempted (including rejected ones).
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    /// Makes the next fetch fail with a retryable transport error.
    pub fn fail_next_fetch(&self, message: impl Into<String>) {
        *self.fail_next_fetch.lock() = Some(message.into());
    }

    /// Makes the next write fail with a retryable transport error.
    pub fn fail_next_store(&self, message: impl Into<String>) {
        *self.fail_next_store.lock() = Some(message.into());
    }

    fn mint_sha(&self) -> String {
        let n = self.next_sha.fetch_add(1, Ordering::SeqCst);
        format!("memsha-{n}")
    }
}

impl ContentHost for MemoryHost {
    fn fetch(&self) -> RemoteResult<Option<RemoteFile>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next_fetch.lock().take() {
            return Err(RemoteError::transport_retryable(message));
        }
        Ok(self.file.lock().as_ref().map(|f| RemoteFile {
            content: wrap_lines(&f.content, 60),
            sha: f.sha.clone(),
        }))
    }

    fn store(&self, payload: &PutPayload) -> RemoteResult<String> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next_store.lock().take() {
            return Err(RemoteError::transport_retryable(message));
        }

        let mut file = self.file.lock();
        match (file.as_ref(), payload.sha.as_deref()) {
            (Some(current), Some(sha)) if sha != current.sha => {
                return Err(RemoteError::conflict(format!(
                    "{} does not match {}",
                    sha, current.sha
                )));
            }
            (Some(_), None) => {
                return Err(RemoteError::conflict(
                    "sha required to update an existing file",
                ));
            }
            (None, Some(_)) => {
                return Err(RemoteError::conflict("file does not exist"));
            }
            _ => {}
        }

        let sha = self.mint_sha();
        *file = Some(StoredFile {
            content: payload.content.split_whitespace().collect(),
            sha: sha.clone(),
        });
        Ok(sha)
    }
}

fn wrap_lines(content: &str, width: usize) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / width + 1);
    for (i, ch) in content.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(content: &str, sha: Option<&str>) -> PutPayload {
        use base64::Engine as _;
        PutPayload {
            message: "test".into(),
            content: base64::engine::general_purpose::STANDARD.encode(content),
            sha: sha.map(String::from),
        }
    }

    #[test]
    fn empty_host_fetches_none() {
        let host = MemoryHost::new();
        assert!(host.fetch().unwrap().is_none());
        assert_eq!(host.fetch_calls(), 1);
    }

    #[test]
    fn first_write_needs_no_sha() {
        let host = MemoryHost::new();
        let sha = host.store(&put("[]", None)).unwrap();
        assert_eq!(host.sha().as_deref(), Some(sha.as_str()));
        assert_eq!(host.raw_content().as_deref(), Some("[]"));
    }

    #[test]
    fn update_requires_current_sha() {
        let host = MemoryHost::new();
        let sha = host.store(&put("[]", None)).unwrap();

        // Missing sha on an existing file
        let err = host.store(&put("[1]", None)).unwrap_err();
        assert!(matches!(err, RemoteError::Conflict { .. }));

        // Stale sha
        let err = host.store(&put("[1]", Some("bogus"))).unwrap_err();
        assert!(matches!(err, RemoteError::Conflict { .. }));

        // Content untouched by rejected writes
        assert_eq!(host.raw_content().as_deref(), Some("[]"));

        // Correct sha succeeds
        let new_sha = host.store(&put("[1]", Some(&sha))).unwrap();
        assert_ne!(new_sha, sha);
        assert_eq!(host.raw_content().as_deref(), Some("[1]"));
    }

    #[test]
    fn fetched_content_is_line_wrapped() {
        let host = MemoryHost::new();
        host.seed(&"x".repeat(100));
        let file = host.fetch().unwrap().unwrap();
        assert!(file.content.contains('\n'));
    }

    #[test]
    fn injected_store_failure_fires_once() {
        let host = MemoryHost::new();
        host.fail_next_store("connection reset");

        let err = host.store(&put("[]", None)).unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Transport { retryable: true, .. }
        ));

        host.store(&put("[]", None)).unwrap();
        assert_eq!(host.store_calls(), 2);
    }
}
