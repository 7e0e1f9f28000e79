use crate::models::LedgerData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared ledger state. The single mutex serialises every read-modify-write,
/// so two movements for the same goal can never interleave.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub password: Option<String>,
    pub data: Arc<Mutex<LedgerData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, password: Option<String>, data: LedgerData) -> Self {
        Self {
            data_path,
            password,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// True when no password is configured or `given` matches it.
    pub fn accepts(&self, given: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => given == Some(expected.as_str()),
        }
    }
}
