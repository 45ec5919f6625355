// ==========================================
// 联系人导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::ingest::IngestSummary;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源读取错误（终止批量流）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("表头缺少必需列: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("数据源已中断: {0}")]
    SourceInterrupted(String),

    // ===== 存储/表结构错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    /// 是否为数据源读取错误
    pub fn is_source_error(&self) -> bool {
        !matches!(self, ImportError::Repository(_))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// IngestAborted - 批量导入提前终止
// ==========================================
// 携带终止前的部分汇总（至少包含已处理行数）
#[derive(Error, Debug)]
#[error("批量导入中止（已处理 {processed} 行）: {cause}", processed = .summary.processed)]
pub struct IngestAborted {
    pub summary: IngestSummary,
    #[source]
    pub cause: ImportError,
}
