// ==========================================
// 联系人导入系统 - 批量导入结果模型
// ==========================================
// 职责: 行级诊断、导入汇总统计
// ==========================================

use crate::domain::contact::FieldViolation;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RowFailure - 行失败原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFailure {
    /// 字段校验失败（仅记录首个违规）
    Rejected(FieldViolation),
    /// 校验通过但写库失败
    Storage { message: String },
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFailure::Rejected(v) => write!(f, "校验失败 {}", v),
            RowFailure::Storage { message } => write!(f, "写库失败 {}", message),
        }
    }
}

// ==========================================
// RowDiagnostic - 行级诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    pub row_number: usize, // 1 起始的行号（不含表头）
    pub failure: RowFailure,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第 {} 行: {}", self.row_number, self.failure)
    }
}

// ==========================================
// IngestSummary - 批量导入汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub batch_id: String,
    pub processed: usize,      // 已读取行数
    pub stored: usize,         // 成功落库
    pub rejected: usize,       // 校验拒绝
    pub storage_failed: usize, // 写库失败
    pub elapsed_ms: u128,

    /// 保留的诊断明细（上限由配置决定）
    pub diagnostics: Vec<RowDiagnostic>,
    /// 超出上限未保留的诊断数
    pub diagnostics_dropped: usize,
}

impl IngestSummary {
    pub fn new(batch_id: String) -> Self {
        Self {
            batch_id,
            ..Self::default()
        }
    }

    /// 失败行总数
    pub fn failed(&self) -> usize {
        self.rejected + self.storage_failed
    }

    /// 记录诊断；超过上限只计数
    pub(crate) fn push_diagnostic(&mut self, diagnostic: RowDiagnostic, limit: usize) {
        if self.diagnostics.len() < limit {
            self.diagnostics.push(diagnostic);
        } else {
            self.diagnostics_dropped += 1;
        }
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "批次 {}: 处理 {} 行, 入库 {}, 校验拒绝 {}, 写库失败 {}, 耗时 {}ms",
            self.batch_id,
            self.processed,
            self.stored,
            self.rejected,
            self.storage_failed,
            self.elapsed_ms
        )
    }
}
