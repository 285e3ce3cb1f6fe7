use bookshelf_db::pool::DbConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// SQLite file and pool settings
    #[serde(default)]
    pub database: DbConfig,
}
