// ==========================================
// 联系人导入系统 - 联系人 Repository 实现
// ==========================================
// 职责: 实现联系人存储（使用 rusqlite）
// 约束: 所有写入使用参数化语句，防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::contact::{ContactField, ContactRecord};
use crate::repository::contact_repo::{ContactRepository, StoredContact};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 目标表名
pub const CONTACT_TABLE: &str = "contact_record";

/// 建表语句（仅在表不存在时创建）
const CREATE_CONTACT_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS contact_record (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        second_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

const SELECT_COLUMNS: &str =
    "id, first_name, second_name, email, phone_number, postal_code, created_at";

/// 写入时间列（insert 显式写入）
pub const CREATED_AT_COLUMN: &str = "created_at";

/// 校验表结构时要求存在的列：五个字段列 + 写入时间列
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    ContactField::ALL
        .iter()
        .map(|f| f.column())
        .chain(std::iter::once(CREATED_AT_COLUMN))
}

// ==========================================
// ContactRepositoryImpl
// ==========================================
pub struct ContactRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ContactRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - busy_timeout: SQLite busy_timeout
    pub fn new(db_path: &str, busy_timeout: Duration) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path, busy_timeout)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与其他组件共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_stored(row: &Row<'_>) -> rusqlite::Result<StoredContact> {
        Ok(StoredContact {
            id: row.get(0)?,
            record: ContactRecord {
                first_name: row.get(1)?,
                second_name: row.get(2)?,
                email: row.get(3)?,
                phone_number: row.get(4)?,
                postal_code: row.get(5)?,
            },
            created_at: row.get(6)?,
        })
    }
}

#[async_trait]
impl ContactRepository for ContactRepositoryImpl {
    async fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(CREATE_CONTACT_TABLE_SQL)?;
        Ok(())
    }

    async fn describe_columns(&self) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.lock()?;

        // 表名为内部常量，直接内联
        let sql = format!("SELECT name FROM pragma_table_info('{}')", CONTACT_TABLE);
        let mut stmt = conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(columns)
    }

    async fn insert(&self, record: &ContactRecord) -> RepositoryResult<i64> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO contact_record (
                first_name, second_name, email, phone_number, postal_code, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.first_name,
                record.second_name,
                record.email,
                record.phone_number,
                record.postal_code,
                Utc::now(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn count_contacts(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM contact_record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StoredContact>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM contact_record WHERE id = ?1", SELECT_COLUMNS);
        let stored = conn
            .query_row(&sql, params![id], Self::map_stored)
            .optional()?;
        Ok(stored)
    }

    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<StoredContact>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM contact_record ORDER BY id DESC LIMIT ?1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], Self::map_stored)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_repo() -> ContactRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        ContactRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn anna() -> ContactRecord {
        ContactRecord {
            first_name: "Anna".to_string(),
            second_name: "Bell".to_string(),
            email: "a@b.com".to_string(),
            phone_number: "0871234567".to_string(),
            postal_code: "1A2B3C".to_string(),
        }
    }

    #[tokio::test]
    async fn test_describe_columns_empty_before_create() {
        let repo = memory_repo();
        assert!(repo.describe_columns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_table_twice_is_idempotent() {
        let repo = memory_repo();
        repo.ensure_table().await.unwrap();
        repo.ensure_table().await.unwrap();

        let columns = repo.describe_columns().await.unwrap();
        for col in required_columns() {
            assert!(columns.contains(col), "missing {}", col);
        }

        let conn = repo.lock().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='contact_record'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn test_insert_and_read_back_preserves_leading_zero() {
        let repo = memory_repo();
        repo.ensure_table().await.unwrap();

        let id = repo.insert(&anna()).await.unwrap();
        let stored = repo.find_by_id(id).await.unwrap().expect("row should exist");

        assert_eq!(stored.record, anna());
        assert_eq!(stored.record.phone_number, "0871234567");
        assert_eq!(repo.count_contacts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_without_table_fails() {
        let repo = memory_repo();
        let result = repo.insert(&anna()).await;
        assert!(matches!(result, Err(RepositoryError::DatabaseQueryError(_))));
    }

    #[tokio::test]
    async fn test_duplicates_allowed_and_listed_newest_first() {
        let repo = memory_repo();
        repo.ensure_table().await.unwrap();

        let first = repo.insert(&anna()).await.unwrap();
        let second = repo.insert(&anna()).await.unwrap();

        let recent = repo.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second);
        assert_eq!(recent[1].id, first);
    }
}
