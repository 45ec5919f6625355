// ==========================================
// 联系人导入系统 - 联系人 Repository Trait
// ==========================================
// 职责: 定义联系人存储接口（不包含业务逻辑）
// 红线: Repository 不含校验规则，只做数据读写
// ==========================================

use crate::domain::contact::ContactRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 已落库的联系人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    pub id: i64,
    #[serde(flatten)]
    pub record: ContactRecord,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// ContactRepository Trait
// ==========================================
// 用途: 批量导入与表单提交共用的存储接口
// 实现者: ContactRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// 建表（CREATE TABLE IF NOT EXISTS 语义，可重复调用）
    async fn ensure_table(&self) -> RepositoryResult<()>;

    /// 读取目标表当前列名集合（表不存在时返回空集合）
    async fn describe_columns(&self) -> RepositoryResult<BTreeSet<String>>;

    /// 插入一条已通过校验的记录
    ///
    /// # 返回
    /// - Ok(i64): 新记录 ID
    /// - Err: 数据库错误
    async fn insert(&self, record: &ContactRecord) -> RepositoryResult<i64>;

    /// 统计记录数
    async fn count_contacts(&self) -> RepositoryResult<usize>;

    /// 按 ID 查询
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StoredContact>>;

    /// 查询最近写入的记录（按 ID 倒序）
    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<StoredContact>>;
}
