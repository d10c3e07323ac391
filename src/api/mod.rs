// ==========================================
// 锻造 ERP 产量对账引擎 - API 层
// ==========================================
// 职责: 参数校验 + 委托引擎，供 CLI 或宿主服务调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardRequest, MAX_TOP_N};
pub use error::{ApiError, ApiResult};
