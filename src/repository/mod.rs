// ==========================================
// 联系人导入系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod contact_repo;
pub mod contact_repo_impl;
pub mod error;
pub mod schema_guard;

// 重导出核心仓储
pub use contact_repo::{ContactRepository, StoredContact};
pub use contact_repo_impl::{ContactRepositoryImpl, CONTACT_TABLE};
pub use error::{RepositoryError, RepositoryResult};
pub use schema_guard::SchemaGuard;
