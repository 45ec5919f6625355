// ==========================================
// 联系人导入系统 - 批量导入管道
// ==========================================
// 职责: 逐行驱动 校验 → 落库，累计行级结果
// 流程: 读行 → 记录校验 → (首次写入前) 表结构守卫 → 写库 → 诊断/计数
// 约束:
// - 严格按数据源顺序逐行处理，写库一次一条
// - 单行校验失败/写库失败只记诊断，继续下一行
// - 表结构不符、数据源读取错误终止整批，返回部分汇总
// - 不跨行持有记录，不重试
// ==========================================

use crate::domain::contact::RawRecord;
use crate::domain::ingest::{IngestSummary, RowDiagnostic, RowFailure};
use crate::importer::error::{IngestAborted, ImportError, ImportResult};
use crate::importer::record_validator::RecordValidator;
use crate::repository::{ContactRepository, SchemaGuard};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 默认保留的诊断条数
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 100;

// ==========================================
// IngestionPipeline
// ==========================================
pub struct IngestionPipeline<R: ContactRepository> {
    repo: Arc<R>,
    guard: Arc<SchemaGuard<R>>,
    validator: RecordValidator,
    max_diagnostics: usize,
}

impl<R: ContactRepository> IngestionPipeline<R> {
    /// 创建新的导入管道
    ///
    /// # 参数
    /// - repo: 联系人存储（与表单提交共用）
    /// - guard: 表结构守卫（进程内共享）
    /// - max_diagnostics: 汇总中保留的诊断条数上限
    pub fn new(repo: Arc<R>, guard: Arc<SchemaGuard<R>>, max_diagnostics: usize) -> Self {
        Self {
            repo,
            guard,
            validator: RecordValidator::new(),
            max_diagnostics,
        }
    }

    /// 执行一次批量导入
    ///
    /// # 返回
    /// - Ok(IngestSummary): 数据源读完
    /// - Err(IngestAborted): 数据源读取错误或表结构不符，附带已处理部分的汇总
    #[instrument(skip(self, source), fields(batch_id = tracing::field::Empty))]
    pub async fn run<S>(&self, source: S) -> Result<IngestSummary, IngestAborted>
    where
        S: Stream<Item = ImportResult<RawRecord>> + Send,
    {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, "开始批量导入");

        let mut summary = IngestSummary::new(batch_id);
        let mut source = Box::pin(source);

        while let Some(item) = source.next().await {
            let raw = match item {
                Ok(raw) => raw,
                Err(cause) => {
                    error!(processed = summary.processed, error = %cause, "数据源读取失败，终止导入");
                    return Err(self.abort(summary, cause, start_time));
                }
            };

            summary.processed += 1;
            let row_number = summary.processed;

            if let Err(cause) = self.process_row(row_number, &raw, &mut summary).await {
                error!(row = row_number, error = %cause, "表结构不可用，终止导入");
                return Err(self.abort(summary, cause, start_time));
            }
        }

        summary.elapsed_ms = start_time.elapsed().as_millis();
        info!(
            batch_id = %summary.batch_id,
            processed = summary.processed,
            stored = summary.stored,
            rejected = summary.rejected,
            storage_failed = summary.storage_failed,
            elapsed_ms = summary.elapsed_ms,
            "批量导入完成"
        );
        Ok(summary)
    }

    /// 处理单行
    ///
    /// 只有表结构错误会向上返回，其余失败均记入汇总
    async fn process_row(
        &self,
        row_number: usize,
        raw: &RawRecord,
        summary: &mut IngestSummary,
    ) -> ImportResult<()> {
        // === 步骤 1: 记录校验 ===
        let record = match self.validator.validate_raw(raw) {
            Ok(record) => record,
            Err(violations) => {
                // 每行只报告首个违规
                if let Some(first) = violations.into_iter().next() {
                    warn!(
                        row = row_number,
                        field = %first.field,
                        reason = %first.reason,
                        "行校验失败"
                    );
                    summary.push_diagnostic(
                        RowDiagnostic {
                            row_number,
                            failure: RowFailure::Rejected(first),
                        },
                        self.max_diagnostics,
                    );
                }
                summary.rejected += 1;
                return Ok(());
            }
        };

        // === 步骤 2: 首次写入前确认表结构 ===
        self.guard.ensure_ready().await.map_err(ImportError::from)?;

        // === 步骤 3: 写库 ===
        match self.repo.insert(&record).await {
            Ok(id) => {
                debug!(row = row_number, id = id, "行写入成功");
                summary.stored += 1;
            }
            Err(e) => {
                warn!(row = row_number, error = %e, "行写入失败");
                summary.push_diagnostic(
                    RowDiagnostic {
                        row_number,
                        failure: RowFailure::Storage {
                            message: e.to_string(),
                        },
                    },
                    self.max_diagnostics,
                );
                summary.storage_failed += 1;
            }
        }

        Ok(())
    }

    fn abort(&self, mut summary: IngestSummary, cause: ImportError, start_time: Instant) -> IngestAborted {
        summary.elapsed_ms = start_time.elapsed().as_millis();
        info!(
            batch_id = %summary.batch_id,
            processed = summary.processed,
            stored = summary.stored,
            rejected = summary.rejected,
            storage_failed = summary.storage_failed,
            "批量导入中止"
        );
        IngestAborted { summary, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::{ContactField, ContactRecord};
    use crate::importer::file_parser::records_stream;
    use crate::repository::contact_repo::StoredContact;
    use crate::repository::contact_repo_impl::required_columns;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    // ==========================================
    // 测试用存储：内存记录 + 可注入的失败
    // ==========================================
    #[derive(Default)]
    struct MockRepo {
        inserted: Mutex<Vec<ContactRecord>>,
        fail_first_names: Vec<String>,
        columns: Option<Vec<&'static str>>,
        ensure_calls: Mutex<usize>,
    }

    #[async_trait]
    impl ContactRepository for MockRepo {
        async fn ensure_table(&self) -> RepositoryResult<()> {
            *self.ensure_calls.lock().unwrap() += 1;
            Ok(())
        }

        async fn describe_columns(&self) -> RepositoryResult<BTreeSet<String>> {
            let cols = self
                .columns
                .clone()
                .unwrap_or_else(|| required_columns().collect());
            Ok(cols.into_iter().map(str::to_string).collect())
        }

        async fn insert(&self, record: &ContactRecord) -> RepositoryResult<i64> {
            if self.fail_first_names.contains(&record.first_name) {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(record.clone());
            Ok(inserted.len() as i64)
        }

        async fn count_contacts(&self) -> RepositoryResult<usize> {
            Ok(self.inserted.lock().unwrap().len())
        }

        async fn find_by_id(&self, _id: i64) -> RepositoryResult<Option<StoredContact>> {
            Ok(None)
        }

        async fn list_recent(&self, _limit: usize) -> RepositoryResult<Vec<StoredContact>> {
            Ok(Vec::new())
        }
    }

    fn raw(first_name: &str, phone_number: &str) -> RawRecord {
        let mut raw = RawRecord::new();
        raw.insert("first_name".to_string(), first_name.to_string());
        raw.insert("second_name".to_string(), "Bell".to_string());
        raw.insert("email".to_string(), "a@b.com".to_string());
        raw.insert("phone_number".to_string(), phone_number.to_string());
        raw.insert("postal_code".to_string(), "1A2B3C".to_string());
        raw
    }

    fn pipeline(repo: Arc<MockRepo>, max_diagnostics: usize) -> IngestionPipeline<MockRepo> {
        let guard = Arc::new(SchemaGuard::new(repo.clone()));
        IngestionPipeline::new(repo, guard, max_diagnostics)
    }

    #[tokio::test]
    async fn test_invalid_middle_row_isolated() {
        let repo = Arc::new(MockRepo::default());
        let rows = vec![
            Ok(raw("Anna", "0871234567")),
            Ok(raw("Bea", "0871234567")),
            Ok(raw("Cara", "12345")),
            Ok(raw("Dee", "0871234567")),
            Ok(raw("Eve", "0871234567")),
        ];

        let summary = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(rows))
            .await
            .unwrap();

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.stored, 4);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.storage_failed, 0);
        assert_eq!(repo.inserted.lock().unwrap().len(), 4);

        let diag = &summary.diagnostics[0];
        assert_eq!(diag.row_number, 3);
        match &diag.failure {
            RowFailure::Rejected(v) => assert_eq!(v.field, ContactField::PhoneNumber),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_stop_batch() {
        let repo = Arc::new(MockRepo {
            fail_first_names: vec!["Bea".to_string()],
            ..MockRepo::default()
        });
        let rows = vec![
            Ok(raw("Anna", "0871234567")),
            Ok(raw("Bea", "0871234567")),
            Ok(raw("Cara", "0871234567")),
        ];

        let summary = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(rows))
            .await
            .unwrap();

        assert_eq!(summary.stored, 2);
        assert_eq!(summary.storage_failed, 1);
        assert_eq!(summary.diagnostics.len(), 1);
        assert_eq!(summary.diagnostics[0].row_number, 2);
        assert!(matches!(summary.diagnostics[0].failure, RowFailure::Storage { .. }));

        let names: Vec<String> = repo
            .inserted
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.first_name.clone())
            .collect();
        assert_eq!(names, vec!["Anna", "Cara"]);
    }

    #[tokio::test]
    async fn test_source_error_aborts_with_processed_count() {
        let repo = Arc::new(MockRepo::default());
        let rows = vec![
            Ok(raw("Anna", "0871234567")),
            Ok(raw("Bea", "bad")),
            Err(ImportError::CsvParseError("unexpected EOF".to_string())),
            Ok(raw("Cara", "0871234567")),
        ];

        let aborted = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(rows))
            .await
            .unwrap_err();

        assert_eq!(aborted.summary.processed, 2);
        assert_eq!(aborted.summary.stored, 1);
        assert_eq!(aborted.summary.rejected, 1);
        assert!(aborted.cause.is_source_error());
        // 中断前已写入的行保留
        assert_eq!(repo.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_schema_mismatch_aborts_before_any_insert() {
        let repo = Arc::new(MockRepo {
            columns: Some(vec!["first_name", "second_name", "email"]),
            ..MockRepo::default()
        });
        let rows = vec![
            Ok(raw("Anna", "bad")),
            Ok(raw("Bea", "0871234567")),
            Ok(raw("Cara", "0871234567")),
        ];

        let aborted = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(rows))
            .await
            .unwrap_err();

        assert_eq!(aborted.summary.processed, 2);
        assert_eq!(aborted.summary.rejected, 1);
        assert_eq!(aborted.summary.stored, 0);
        match aborted.cause {
            ImportError::Repository(RepositoryError::SchemaMismatch { missing }) => {
                assert_eq!(missing, vec!["phone_number", "postal_code", "created_at"]);
            }
            other => panic!("Expected SchemaMismatch, got {}", other),
        }
        assert!(repo.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_checked_once_per_guard() {
        let repo = Arc::new(MockRepo::default());
        let p = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS);

        let rows = vec![Ok(raw("Anna", "0871234567")), Ok(raw("Bea", "0871234567"))];
        p.run(records_stream(rows)).await.unwrap();
        p.run(records_stream(vec![Ok(raw("Cara", "0871234567"))]))
            .await
            .unwrap();

        assert_eq!(*repo.ensure_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_all_invalid_never_touches_schema() {
        let repo = Arc::new(MockRepo::default());
        let rows = vec![Ok(raw("", "0871234567")), Ok(raw("Bea", "x"))];

        let summary = pipeline(repo.clone(), DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(rows))
            .await
            .unwrap();

        assert_eq!(summary.rejected, 2);
        assert_eq!(*repo.ensure_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_yields_empty_summary() {
        let repo = Arc::new(MockRepo::default());
        let summary = pipeline(repo, DEFAULT_MAX_DIAGNOSTICS)
            .run(records_stream(Vec::new()))
            .await
            .unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.failed(), 0);
        assert!(!summary.batch_id.is_empty());
    }

    #[tokio::test]
    async fn test_diagnostics_capped_but_counted() {
        let repo = Arc::new(MockRepo::default());
        let rows: Vec<_> = (0..10).map(|_| Ok(raw("Bad!", "0871234567"))).collect();

        let summary = pipeline(repo, 3).run(records_stream(rows)).await.unwrap();

        assert_eq!(summary.rejected, 10);
        assert_eq!(summary.diagnostics.len(), 3);
        assert_eq!(summary.diagnostics_dropped, 7);
    }
}
