use crate::models::HabitStore;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: Option<PathBuf>,
    pub store: Arc<Mutex<HabitStore>>,
}

impl AppState {
    pub fn new(data_path: Option<PathBuf>, store: HabitStore) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(store)),
        }
    }
}
