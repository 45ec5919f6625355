// ==========================================
// 联系人导入系统 - API 层
// ==========================================
// 职责: 提供批量导入与表单提交接口，供命令行入口调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod submission_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use submission_api::{
    SubmissionHandler, SubmissionOutcome, SubmissionResponse, SubmissionStatus,
};
