// ==========================================
// 锻造 ERP 产量对账引擎 - 领域模型层
// ==========================================
// 职责: 定义记录、聚合、汇总等领域对象与类型
// 红线: 不含数据访问逻辑，不含引擎逻辑
// ==========================================

pub mod aggregate;
pub mod measure;
pub mod record;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use aggregate::{GroupAggregate, UniqueUnitEntry, UniqueUnitMap, UnitKey};
pub use measure::MeasureFormula;
pub use record::{is_npd_component, NormalizedRecord, RawRecord, NPD_SUFFIX, UNKNOWN_KEY};
pub use summary::{
    CategoryShare, DashboardReport, HeatReconciliationRow, KpiSummary, ReconciliationReport,
    StageTotals, TrendPoint, YieldSummary,
};
pub use types::{Department, GroupField, NpdMode, PrimaryMeasure, RankMeasure, Stage};
