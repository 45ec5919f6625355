// ==========================================
// 联系人导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 全进程共用一个数据库连接和一个表结构守卫
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, ImportApi, SubmissionHandler};
use crate::config::IntakeConfig;
use crate::db::open_sqlite_connection;
use crate::repository::{ContactRepositoryImpl, SchemaGuard};

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 联系人存储
    pub contact_repo: Arc<ContactRepositoryImpl>,

    /// 表结构守卫
    pub schema_guard: Arc<SchemaGuard<ContactRepositoryImpl>>,

    /// 表单提交处理
    pub submission_handler: SubmissionHandler<ContactRepositoryImpl>,

    /// 批量导入API
    pub import_api: ImportApi<ContactRepositoryImpl>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开数据库、建表并校验表结构
    pub async fn new(config: &IntakeConfig) -> ApiResult<Self> {
        tracing::info!(db_path = %config.db_path, "初始化AppState");

        let conn = open_sqlite_connection(&config.db_path, config.busy_timeout).map_err(|e| {
            ApiError::DatabaseConnectionError(format!("无法打开数据库 {}: {}", config.db_path, e))
        })?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let contact_repo = Arc::new(ContactRepositoryImpl::from_connection(conn));
        let schema_guard = Arc::new(SchemaGuard::new(contact_repo.clone()));

        // 启动时建表（已存在则只校验）
        schema_guard.ensure_ready().await?;

        // ==========================================
        // 初始化API层
        // ==========================================
        let submission_handler = SubmissionHandler::new(contact_repo.clone(), schema_guard.clone());
        let import_api = ImportApi::new(
            contact_repo.clone(),
            schema_guard.clone(),
            config.source_buffer,
            config.max_diagnostics,
        );

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path: config.db_path.clone(),
            contact_repo,
            schema_guard,
            submission_handler,
            import_api,
        })
    }
}
