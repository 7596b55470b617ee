// ==========================================
// 来料检验系统 - 配置层
// ==========================================
// 职责: 检验参数管理（缺省值 + config_kv 覆写）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod inspection_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use inspection_config::InspectionConfig;
