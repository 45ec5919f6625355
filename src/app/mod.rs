// ==========================================
// 联系人导入系统 - 应用层
// ==========================================
// 职责: 组装共享连接、存储与API实例
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
