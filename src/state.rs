use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::storage::UploadStore;
use crate::store::DynStore;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub uploads: UploadStore,
}
