// ==========================================
// 联系人导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 联系人数据字段校验与入库（CSV 批量导入 + 表单单条提交）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与违规类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 字段规则、CSV 数据源、导入管道
pub mod importer;

// 配置层 - 运行参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ContactField, ContactRecord, FieldViolation, IngestSummary, RawRecord, RowDiagnostic,
    RowFailure, RuleViolation,
};

// 导入
pub use importer::{CsvSource, IngestAborted, IngestionPipeline, RecordValidator, RecordVerdict};

// 仓储
pub use repository::{ContactRepository, ContactRepositoryImpl, SchemaGuard, StoredContact};

// API
pub use api::{ImportApi, SubmissionHandler, SubmissionOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "联系人导入系统";
