use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::catalog::Semester;
use super::err::ConfigError;

pub const DEFAULT_MAX_CREDITS: u32 = 30;
pub const DEFAULT_DATA_FILE: &str = "data.json";

const DATA_FILE_KEY: &str = "UNIREG_DATA_FILE";
const MAX_CREDITS_KEY: &str = "UNIREG_MAX_CREDITS";
const LOG_LEVEL_KEY: &str = "UNIREG_LOG_LEVEL";
const LOG_FILE_KEY: &str = "UNIREG_LOG_FILE";

/// 进程启动配置, 来自环境变量或 .env 文件
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub max_credits: u32,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            max_credits: DEFAULT_MAX_CREDITS,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read the settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(path) = lookup(DATA_FILE_KEY) {
            settings.data_file = PathBuf::from(path);
        }
        if let Some(value) = lookup(MAX_CREDITS_KEY) {
            settings.max_credits = parse(MAX_CREDITS_KEY, &value)?;
        }
        if let Some(value) = lookup(LOG_LEVEL_KEY) {
            settings.log_level = parse(LOG_LEVEL_KEY, &value)?;
        }
        settings.log_file = lookup(LOG_FILE_KEY).map(PathBuf::from);
        Ok(settings)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// 运行期可调整的选课/排课开关与学分上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub registration_open: bool,
    pub scheduling_open: bool,
    pub max_credits: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            registration_open: true,
            scheduling_open: true,
            max_credits: DEFAULT_MAX_CREDITS,
        }
    }
}

/// 当前学年与学期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub year: i32,
    pub semester: Semester,
}

impl Calendar {
    pub fn new(year: i32, semester: Semester) -> Self {
        Self { year, semester }
    }

    /// Step to the next semester; returns true when a new academic year began.
    pub fn advance(&mut self) -> bool {
        self.semester = self.semester.next();
        if self.semester == Semester::Fall {
            self.year += 1;
            return true;
        }
        false
    }
}
