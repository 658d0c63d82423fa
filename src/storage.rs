use crate::errors::AppError;
use crate::models::HabitStore;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

const DEFAULT_DATA_PATH: &str = "data/habits.json";

pub fn resolve_data_path() -> Option<PathBuf> {
    match env::var("APP_DATA_PATH") {
        Ok(path) if path.trim().is_empty() => None,
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => Some(PathBuf::from(DEFAULT_DATA_PATH)),
    }
}

pub async fn load_store(path: &Path) -> HabitStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<HabitStore>(&bytes) {
            Ok(store) => {
                info!(habits = store.habits.len(), "loaded habits from {}", path.display());
                store
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                HabitStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HabitStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            HabitStore::default()
        }
    }
}

pub async fn persist_store(path: Option<&Path>, store: &HabitStore) -> Result<(), AppError> {
    let Some(path) = path else {
        debug!("memory-only mode, skipping persist");
        return Ok(());
    };
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Habit;
    use chrono::NaiveDate;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("habit_tracker_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn persisted_store_loads_back() {
        let path = temp_path("roundtrip");
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let store = HabitStore::default()
            .with_habit(Habit::boolean("Water").unwrap().toggled(day).unwrap())
            .with_habit(Habit::numeric("Reading", "pages").unwrap().with_value(day, 10.0).unwrap());

        persist_store(Some(&path), &store).await.unwrap();
        let loaded = load_store(&path).await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.habits, store.habits);
    }

    #[tokio::test]
    async fn missing_or_broken_file_starts_empty() {
        let missing = temp_path("missing");
        assert!(load_store(&missing).await.habits.is_empty());

        let broken = temp_path("broken");
        std::fs::write(&broken, b"{ not json").unwrap();
        let loaded = load_store(&broken).await;
        let _ = std::fs::remove_file(&broken);
        assert!(loaded.habits.is_empty());
    }

    #[tokio::test]
    async fn memory_only_skips_disk() {
        assert!(persist_store(None, &HabitStore::default()).await.is_ok());
    }

    #[test]
    fn stored_shape_is_tagged() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let habit = Habit::numeric("Reading", "pages").unwrap().with_value(day, 10.0).unwrap();
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["track_type"], "numeric");
        assert_eq!(json["unit"], "pages");
        assert_eq!(json["values"]["2024-05-01"], 10.0);
    }
}
