// ==========================================
// 联系人导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、字段违规、导入结果
// 红线: 不含数据访问逻辑
// ==========================================

pub mod contact;
pub mod ingest;

// 重导出核心类型
pub use contact::{ContactField, ContactRecord, FieldViolation, RawRecord, RuleViolation};
pub use ingest::{IngestSummary, RowDiagnostic, RowFailure};
