/// Workspace Manager - one private directory per request
///
/// **Rules:**
/// - Every request gets a freshly named directory under the temp root
/// - A workspace is never shared or reused
/// - `release` removes it; failure to remove is logged, never surfaced
/// - A workspace dropped without `release` (panic, cancelled request) is
///   removed by its `Drop` guard
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a fresh uniquely named directory under `temp_root`
    pub async fn acquire(temp_root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(temp_root)
            .await
            .with_context(|| format!("Failed to create temp root {}", temp_root.display()))?;

        let path = temp_root.join(Uuid::new_v4().to_string());
        // create_dir (not create_dir_all) so an existing directory is an error
        tokio::fs::create_dir(&path)
            .await
            .with_context(|| format!("Failed to create workspace {}", path.display()))?;

        debug!(workspace = %path.display(), "Workspace acquired");
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively delete the workspace
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(workspace = %self.path.display(), "Workspace released"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                workspace = %self.path.display(),
                error = %e,
                "Failed to remove workspace"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Cannot await in Drop; blocking removal is acceptable on this path
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(workspace = %self.path.display(), "Workspace removed on drop"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                workspace = %self.path.display(),
                error = %e,
                "Failed to remove workspace on drop"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let root = tempfile::tempdir().unwrap();

        let workspace = Workspace::acquire(root.path()).await.unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.starts_with(root.path()));

        tokio::fs::write(path.join("main.py"), "print(1)").await.unwrap();
        tokio::fs::create_dir(path.join("__pycache__")).await.unwrap();

        workspace.release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let root = tempfile::tempdir().unwrap();

        let a = Workspace::acquire(root.path()).await.unwrap();
        let b = Workspace::acquire(root.path()).await.unwrap();
        assert_ne!(a.path(), b.path());

        a.release().await;
        assert!(b.path().exists());
        b.release().await;
    }

    #[tokio::test]
    async fn test_creates_missing_temp_root() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        let workspace = Workspace::acquire(&nested).await.unwrap();
        assert!(workspace.path().starts_with(&nested));
        workspace.release().await;
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();

        let path = {
            let workspace = Workspace::acquire(root.path()).await.unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_directory() {
        let root = tempfile::tempdir().unwrap();

        let workspace = Workspace::acquire(root.path()).await.unwrap();
        std::fs::remove_dir_all(workspace.path()).unwrap();
        workspace.release().await;
    }

    #[tokio::test]
    async fn test_acquire_fails_when_root_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        assert!(Workspace::acquire(&file).await.is_err());
    }
}
