use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::session::{Credential, CredentialStore, StoreError};

const DEFAULT_SESSION_PATH: &str = "config/tally_session.json";

/// Credential persisted as JSON on disk, so a login survives between runs.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<Credential>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(credential)?;
        let mut file = owner_only()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        restrict_permissions(&file)?;
        file.write_all(payload.as_bytes())?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Option<Credential> {
        let _guard = self.lock.lock();
        match self.load() {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "unreadable session file: {err}");
                None
            }
        }
    }

    fn set(&self, credential: Credential) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.save(&credential)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// The file holds a bearer token: readable by the owner only.
#[cfg(unix)]
fn owner_only() -> fs::OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = fs::OpenOptions::new();
    options.mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only() -> fs::OpenOptions {
    fs::OpenOptions::new()
}

// `mode` only applies on creation; tighten a file left by an older run.
#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

pub fn default_session_path() -> &'static str {
    DEFAULT_SESSION_PATH
}
