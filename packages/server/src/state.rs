use std::sync::Arc;

use common::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub notifier: Arc<dyn Notifier>,
    pub media: Arc<dyn MediaStore>,
}
