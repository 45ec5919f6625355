// ==========================================
// 联系人导入系统 - 批量导入API
// ==========================================
// 职责: 打开 CSV 数据源并驱动导入管道，返回导入汇总
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::contact::RawRecord;
use crate::domain::ingest::IngestSummary;
use crate::importer::{CsvSource, ImportResult, IngestionPipeline};
use crate::repository::{ContactRepository, SchemaGuard};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 是否读完整个数据源
    pub completed: bool,
    /// 中止原因（数据源读取错误 / 表结构不符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
    /// 行级汇总（中止时为已处理部分）
    pub summary: IngestSummary,
}

/// 导入API
pub struct ImportApi<R: ContactRepository> {
    pipeline: IngestionPipeline<R>,
    source_buffer: usize,
}

impl<R: ContactRepository> ImportApi<R> {
    pub fn new(
        repo: Arc<R>,
        guard: Arc<SchemaGuard<R>>,
        source_buffer: usize,
        max_diagnostics: usize,
    ) -> Self {
        Self {
            pipeline: IngestionPipeline::new(repo, guard, max_diagnostics),
            source_buffer,
        }
    }

    /// 导入 CSV 文件
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 已开始处理（含中止的情况）
    /// - Err(ApiError): 路径为空、文件无法打开或表头缺列，未处理任何行
    pub async fn import_file(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let source = CsvSource::new(file_path, self.source_buffer).open()?;
        info!(file_path = %file_path, "开始导入 CSV 文件");

        Ok(self.import_stream(source).await)
    }

    /// 导入任意记录流
    pub async fn import_stream<S>(&self, source: S) -> ImportApiResponse
    where
        S: Stream<Item = ImportResult<RawRecord>> + Send,
    {
        match self.pipeline.run(source).await {
            Ok(summary) => ImportApiResponse {
                completed: true,
                abort_reason: None,
                summary,
            },
            Err(aborted) => {
                warn!(processed = aborted.summary.processed, error = %aborted.cause, "导入中止");
                ImportApiResponse {
                    completed: false,
                    abort_reason: Some(aborted.cause.to_string()),
                    summary: aborted.summary,
                }
            }
        }
    }
}
