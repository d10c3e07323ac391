// ==========================================
// 锻造 ERP 产量对账引擎 - 引擎层
// ==========================================
// 流水线: 归一化 → NPD 分区 → 能耗去重 → 分组聚合 → 收得率 → 排名/洞察
// 职责: 纯计算，不做 I/O，不持有可变共享状态
// 红线: 任何比率零保护，缺失数值按 0 处理
// ==========================================

pub mod aggregator;
pub mod dashboard;
pub mod dedup;
pub mod normalizer;
pub mod partitioner;
pub mod reconciliation;
pub mod selector;
pub mod yield_calc;

// 重导出核心引擎
pub use aggregator::{AggregateOptions, GroupingAggregator};
pub use dashboard::{DashboardEngine, DashboardQuery};
pub use dedup::UniqueUnitDeduplicator;
pub use normalizer::RecordNormalizer;
pub use partitioner::NpdPartitioner;
pub use reconciliation::{StageRecords, SteelReconciliationEngine};
pub use selector::{InsightSelector, ALERT_LIMIT};
pub use yield_calc::YieldCalculator;
