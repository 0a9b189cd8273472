use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "gradebookd", version, about = "Student, class and exam grade backend")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "GRADEBOOK_BIND", default_value = "127.0.0.1:8083")]
    pub bind: SocketAddr,

    /// SQLite database file
    #[arg(long, env = "GRADEBOOK_DATABASE", default_value = "./gradebook.sqlite3")]
    pub database: PathBuf,

    /// Directory uploaded spreadsheets are stored in
    #[arg(long, env = "GRADEBOOK_UPLOAD_DIR", default_value = "./file")]
    pub upload_dir: PathBuf,

    /// Maximum number of pooled database connections
    #[arg(long, env = "GRADEBOOK_POOL_SIZE", default_value_t = 20)]
    pub pool_size: u32,

    /// Seconds to wait for a free pooled connection
    #[arg(long, env = "GRADEBOOK_POOL_TIMEOUT_SECS", default_value_t = 15)]
    pub pool_timeout_secs: u64,

    /// Largest accepted upload body, in bytes
    #[arg(long, env = "GRADEBOOK_MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Header of the student name column in imported spreadsheets
    #[arg(long, env = "GRADEBOOK_NAME_COLUMN", default_value = "姓名")]
    pub name_column: String,

    /// Header of the score column in imported spreadsheets
    #[arg(long, env = "GRADEBOOK_SCORE_COLUMN", default_value = "成绩")]
    pub score_column: String,
}

impl Config {
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs)
    }

    pub fn import_columns(&self) -> crate::import::ImportColumns {
        crate::import::ImportColumns {
            name: self.name_column.clone(),
            score: self.score_column.clone(),
        }
    }
}
