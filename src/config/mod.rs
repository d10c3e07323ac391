// ==========================================
// 锻造 ERP 产量对账引擎 - 配置层
// ==========================================
// 职责: 运行参数与部门口径表，支持文件/环境变量覆写
// ==========================================

pub mod config_manager;
pub mod department_profile;
pub mod reconciliation_profile;

// 重导出核心配置
pub use config_manager::{
    config_keys, default_config_path, ConfigError, ConfigManager, ConfigResult, EngineConfig,
    DEFAULT_COST_PER_UNIT, DEFAULT_TOP_N, MAX_TOP_N,
};
pub use department_profile::{DepartmentProfile, DEFAULT_REJECTION_ALERT_THRESHOLD_PCT};
pub use reconciliation_profile::{ReconciliationProfile, StageProfile};
