// ==========================================
// 联系人导入系统 - 导入层
// ==========================================
// 职责: 字段规则、记录校验、CSV 数据源、批量导入管道
// ==========================================

// 模块声明
pub mod error;
pub mod field_rules;
pub mod file_parser;
pub mod pipeline;
pub mod record_validator;

// 重导出核心类型
pub use error::{ImportError, ImportResult, IngestAborted};
pub use file_parser::{records_stream, CsvSource, RecordStream};
pub use pipeline::IngestionPipeline;
pub use record_validator::{RecordValidator, RecordVerdict};
