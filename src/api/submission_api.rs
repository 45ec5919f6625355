// ==========================================
// 联系人导入系统 - 表单提交处理
// ==========================================
// 职责: 处理单条表单提交（表结构校验 → 记录校验 → 写库）
// 约束:
// - 每次调用只处理一条记录，不经过批量导入管道
// - 写库失败直接返回调用方（批量导入则记诊断继续）
// ==========================================

use crate::domain::contact::{FieldViolation, RawRecord};
use crate::importer::RecordValidator;
use crate::repository::{ContactRepository, RepositoryError, SchemaGuard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

// ==========================================
// SubmissionStatus - 提交状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Accepted,
    Rejected,
    ServerError,
}

// ==========================================
// SubmissionOutcome - 提交结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// 已落库
    Stored { id: i64 },
    /// 校验失败（全部字段违规）
    ValidationFailed { violations: Vec<FieldViolation> },
    /// 表结构不符
    SchemaMismatch { missing: Vec<String> },
    /// 写库/查询失败
    StorageError { message: String },
}

impl SubmissionOutcome {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            SubmissionOutcome::Stored { .. } => SubmissionStatus::Accepted,
            SubmissionOutcome::ValidationFailed { .. } => SubmissionStatus::Rejected,
            SubmissionOutcome::SchemaMismatch { .. } | SubmissionOutcome::StorageError { .. } => {
                SubmissionStatus::ServerError
            }
        }
    }

    /// HTTP 风格状态码
    pub fn http_status(&self) -> u16 {
        match self.status() {
            SubmissionStatus::Accepted => 200,
            SubmissionStatus::Rejected => 400,
            SubmissionStatus::ServerError => 500,
        }
    }

    /// 面向用户的提示信息
    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::Stored { .. } => "数据已接收并安全保存".to_string(),
            SubmissionOutcome::ValidationFailed { violations } => {
                let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                format!("提交数据校验失败: {}", details.join("; "))
            }
            SubmissionOutcome::SchemaMismatch { .. } => {
                "服务器错误: 数据库表结构不正确".to_string()
            }
            SubmissionOutcome::StorageError { .. } => "保存数据失败".to_string(),
        }
    }

    /// 转为返回给请求方的响应
    pub fn to_response(&self) -> SubmissionResponse {
        SubmissionResponse {
            status: self.status(),
            http_status: self.http_status(),
            message: self.message(),
            outcome: self.clone(),
        }
    }
}

/// 提交响应（状态 + 提示信息）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub status: SubmissionStatus,
    pub http_status: u16,
    pub message: String,
    pub outcome: SubmissionOutcome,
}

// ==========================================
// SubmissionHandler
// ==========================================
pub struct SubmissionHandler<R: ContactRepository> {
    repo: Arc<R>,
    guard: Arc<SchemaGuard<R>>,
    validator: RecordValidator,
}

impl<R: ContactRepository> SubmissionHandler<R> {
    pub fn new(repo: Arc<R>, guard: Arc<SchemaGuard<R>>) -> Self {
        Self {
            repo,
            guard,
            validator: RecordValidator::new(),
        }
    }

    /// 处理一次表单提交
    #[instrument(skip(self, raw))]
    pub async fn submit(&self, raw: &RawRecord) -> SubmissionOutcome {
        // === 步骤 1: 表结构前置校验 ===
        match self.guard.verify().await {
            Ok(()) => {}
            Err(RepositoryError::SchemaMismatch { missing }) => {
                error!(missing = ?missing, "表结构校验失败，拒绝提交");
                return SubmissionOutcome::SchemaMismatch { missing };
            }
            Err(e) => {
                error!(error = %e, "表结构校验时数据库出错");
                return SubmissionOutcome::StorageError {
                    message: e.to_string(),
                };
            }
        }

        // === 步骤 2: 记录校验（报告全部违规）===
        let record = match self.validator.validate_raw(raw) {
            Ok(record) => record,
            Err(violations) => {
                warn!(violations = violations.len(), "表单校验失败");
                return SubmissionOutcome::ValidationFailed { violations };
            }
        };

        // === 步骤 3: 写库 ===
        match self.repo.insert(&record).await {
            Ok(id) => {
                info!(id = id, "表单数据已保存");
                SubmissionOutcome::Stored { id }
            }
            Err(e) => {
                error!(error = %e, "表单数据保存失败");
                SubmissionOutcome::StorageError {
                    message: e.to_string(),
                }
            }
        }
    }

    /// 表单预览校验（与服务端同一套规则，不写库）
    pub fn preview(&self, raw: &RawRecord) -> Vec<FieldViolation> {
        self.validator.preview(raw)
    }
}
