// ==========================================
// 联系人导入系统 - 配置层
// ==========================================
// 职责: 运行参数加载（环境变量 + 命令行覆写）
// ==========================================

pub mod intake_config;

pub use intake_config::{
    env_keys, get_default_db_path, ConfigError, ConfigResult, IntakeConfig,
};
