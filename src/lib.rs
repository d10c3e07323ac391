// ==========================================
// 锻造 ERP 产量对账引擎 - 核心库
// ==========================================
// 技术栈: Rust + serde + tracing
// 系统定位: 部门看板聚合 + 钢材四阶段对账（纯计算，不做拉取）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录/聚合/报表类型
pub mod domain;

// 引擎层 - 聚合与对账计算
pub mod engine;

// 导入层 - 导出文件加载与字段清洗
pub mod importer;

// 配置层 - 运行参数与部门口径
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 参数校验与编排
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Department, GroupField, NpdMode, PrimaryMeasure, RankMeasure, Stage};

// 领域对象
pub use domain::{
    DashboardReport, GroupAggregate, HeatReconciliationRow, KpiSummary, NormalizedRecord,
    RawRecord, ReconciliationReport, UniqueUnitMap, YieldSummary,
};

// 引擎
pub use engine::{
    DashboardEngine, DashboardQuery, GroupingAggregator, InsightSelector, NpdPartitioner,
    RecordNormalizer, StageRecords, SteelReconciliationEngine, UniqueUnitDeduplicator,
    YieldCalculator,
};

// 配置
pub use config::{ConfigManager, DepartmentProfile, EngineConfig, ReconciliationProfile};

// API
pub use api::{ApiError, ApiResult, DashboardApi, DashboardRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "锻造 ERP 产量对账引擎";
