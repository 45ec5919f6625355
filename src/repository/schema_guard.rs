// ==========================================
// 联系人导入系统 - 表结构守卫
// ==========================================
// 职责: 首次写入前确保 contact_record 表存在且列齐全
// 约束:
// - ensure_ready 幂等，依赖 CREATE TABLE IF NOT EXISTS，不加互斥锁
// - 就绪标记只在校验通过后置位，之后只读
// - verify 每次都读取实时列集合，供请求时前置检查
// ==========================================

use crate::repository::contact_repo::ContactRepository;
use crate::repository::contact_repo_impl::required_columns;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SchemaGuard<R: ContactRepository> {
    repo: Arc<R>,
    ready: AtomicBool,
}

impl<R: ContactRepository> SchemaGuard<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            ready: AtomicBool::new(false),
        }
    }

    /// 本进程内是否已确认就绪
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// 确保表就绪（不存在则创建，随后校验列）
    ///
    /// # 返回
    /// - Ok(()): 表已就绪
    /// - Err(SchemaMismatch): 表存在但缺列
    /// - Err(其他): 建表/查询失败
    pub async fn ensure_ready(&self) -> RepositoryResult<()> {
        if self.is_ready() {
            return Ok(());
        }

        debug!("表结构未确认，执行建表检查");
        self.repo.ensure_table().await?;
        self.verify().await?;

        self.ready.store(true, Ordering::Release);
        info!("contact_record 表结构确认完成");
        Ok(())
    }

    /// 校验实时列集合是否包含全部必需列
    pub async fn verify(&self) -> RepositoryResult<()> {
        let columns = self.repo.describe_columns().await?;

        let missing: Vec<String> = required_columns()
            .filter(|col| !columns.contains(*col))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            warn!(missing = ?missing, "表结构校验失败");
            Err(RepositoryError::SchemaMismatch { missing })
        }
    }
}
