use crate::error::AuthError;
use crate::google_oauth::credentials::GoogleCredential;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The on-disk credential cache. Not locked; concurrent runs may race.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached credential. A missing file or one that no longer
    /// parses both come back as `None`.
    pub async fn load(&self) -> Result<Option<GoogleCredential>, AuthError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no cached credential found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<GoogleCredential>(&contents) {
            Ok(cred) => {
                debug!(path = %self.path.display(), "loaded cached credential");
                Ok(Some(cred))
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cached credential is unreadable; ignoring it"
                );
                Ok(None)
            }
        }
    }

    /// Overwrite the cache with owner-only permissions on Unix.
    pub async fn save(&self, cred: &GoogleCredential) -> Result<(), AuthError> {
        let contents = serde_json::to_string_pretty(cred)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, contents.as_bytes()).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        info!(path = %self.path.display(), "credential saved");
        Ok(())
    }
}
