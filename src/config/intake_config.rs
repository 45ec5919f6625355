// ==========================================
// 联系人导入系统 - 运行配置
// ==========================================
// 职责: 从环境变量读取运行参数（数据库路径、忙等待、通道容量、诊断上限）
// 红线: 只读配置，不写回
// ==========================================

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use crate::importer::file_parser::DEFAULT_SOURCE_BUFFER;
use crate::importer::pipeline::DEFAULT_MAX_DIAGNOSTICS;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 环境变量键
pub mod env_keys {
    pub const DB_PATH: &str = "CONTACT_INTAKE_DB_PATH";
    pub const BUSY_TIMEOUT_MS: &str = "CONTACT_INTAKE_BUSY_TIMEOUT_MS";
    pub const SOURCE_BUFFER: &str = "CONTACT_INTAKE_SOURCE_BUFFER";
    pub const MAX_DIAGNOSTICS: &str = "CONTACT_INTAKE_MAX_DIAGNOSTICS";
}

/// 配置错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置项 {key} 的值无效: {value:?}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// IntakeConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub db_path: String,
    pub busy_timeout: Duration,
    pub source_buffer: usize,
    pub max_diagnostics: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            db_path: get_default_db_path(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            source_buffer: DEFAULT_SOURCE_BUFFER,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }
}

impl IntakeConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（未设置的键取默认值）
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(env_keys::DB_PATH)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(get_default_db_path);

        let busy_timeout_ms =
            parse_number(&lookup, env_keys::BUSY_TIMEOUT_MS, DEFAULT_BUSY_TIMEOUT_MS)?;
        let source_buffer = parse_number(&lookup, env_keys::SOURCE_BUFFER, DEFAULT_SOURCE_BUFFER)?;
        let max_diagnostics =
            parse_number(&lookup, env_keys::MAX_DIAGNOSTICS, DEFAULT_MAX_DIAGNOSTICS)?;

        // 容量为 0 的通道无法传递数据
        if source_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: env_keys::SOURCE_BUFFER.to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            db_path,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            source_buffer,
            max_diagnostics,
        })
    }

    /// 覆盖数据库路径（命令行参数优先）
    pub fn with_db_path(mut self, db_path: Option<String>) -> Self {
        if let Some(path) = db_path.filter(|p| !p.trim().is_empty()) {
            self.db_path = path;
        }
        self
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// 获取默认数据库路径
///
/// 优先用户数据目录，拿不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./contact_intake.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("contact-intake");
        // 建目录失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("contact_intake.db");
        }
    }

    path.to_string_lossy().to_string()
}
