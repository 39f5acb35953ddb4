//! Test utilities for session configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use uuid::Uuid;

use super::SessionEnv;

/// Session key file removed when dropped.
#[derive(Debug)]
pub struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    /// Write `len` bytes of dummy key material to a fresh temporary file.
    pub fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'a'; len])?;
        Ok(Self { path })
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// In-memory toggle source.
#[derive(Debug, Default, Clone)]
pub struct MapEnv(HashMap<&'static str, String>);

impl MapEnv {
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    pub fn without(mut self, name: &'static str) -> Self {
        self.0.remove(name);
        self
    }
}

impl SessionEnv for MapEnv {
    fn string(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
