use crate::errors::AppError;
use crate::models::LedgerData;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

/// Loads the snapshot at `path`. A missing file yields an empty ledger. A
/// file that does not parse is moved aside to `<name>.corrupt-<timestamp>`
/// before starting empty, so its bytes are never overwritten. Any other read
/// error is returned.
pub async fn load_data(path: &Path) -> Result<LedgerData, AppError> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => Ok(data),
            Err(err) => {
                let aside = quarantine_path(path);
                error!(
                    "failed to parse data file: {err}; moving it to {}",
                    aside.display()
                );
                fs::rename(path, &aside).await?;
                Ok(LedgerData::default())
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("no data file at {}, starting empty", path.display());
            Ok(LedgerData::default())
        }
        Err(err) => {
            error!("failed to read data file: {err}");
            Err(AppError::from(err))
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger.json".to_string());
    let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
    path.with_file_name(format!("{name}.corrupt-{stamp}"))
}

/// Writes through a sibling temp file so a crash never leaves half a snapshot.
pub async fn persist_data(path: &Path, data: &LedgerData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await.map_err(|err| {
        error!("failed to write data file: {err}");
        AppError::internal(err)
    })?;
    fs::rename(&tmp, path).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{record_movement, Movement};
    use crate::store::LedgerStore;

    #[tokio::test]
    async fn snapshot_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut data = LedgerData::default();
        let goal = data.insert_goal("patrols", 184);
        record_movement(&mut data, goal, Movement::new(3, "first week")).unwrap();
        persist_data(&path, &data).await.unwrap();

        let loaded = load_data(&path).await.unwrap();
        assert_eq!(loaded.goals, data.goals);
        assert_eq!(loaded.entries, data.entries);
        assert_eq!(loaded.next_entry_id, 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_data(&dir.path().join("absent.json")).await.unwrap();
        assert!(missing.goals.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside_with_its_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let original: &[u8] = br#"{"goals": {"1": {"id": 1, "label": "patrols", "tar"#;
        std::fs::write(&path, original).unwrap();

        let loaded = load_data(&path).await.unwrap();
        assert!(loaded.entries.is_empty());
        assert!(!path.exists());

        // Seeding and saving the fresh ledger must not touch the old bytes.
        persist_data(&path, &loaded).await.unwrap();
        let kept: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("ledger.json.corrupt-")
            })
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(std::fs::read(&kept[0]).unwrap(), original);
    }

    #[tokio::test]
    async fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(load_data(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("ledger.json");
        assert!(persist_data(&path, &LedgerData::default()).await.is_err());
    }
}
