// ==========================================
// 锻造 ERP 产量对账引擎 - 看板 API
// ==========================================
// 职责: 校验查询参数，组装 DashboardQuery，委托给引擎层
// 架构: API 层 → Engine 层（DashboardEngine / SteelReconciliationEngine）
// 说明: 配置快照在构造时注入，调用之间不共享可变状态
// ==========================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{ConfigManager, EngineConfig};
pub use crate::config::config_manager::MAX_TOP_N;
use crate::domain::record::RawRecord;
use crate::domain::summary::{DashboardReport, ReconciliationReport};
use crate::domain::types::{Department, GroupField, NpdMode, RankMeasure};
use crate::engine::dashboard::{DashboardEngine, DashboardQuery};
use crate::engine::reconciliation::{StageRecords, SteelReconciliationEngine};
use crate::importer::file_parser::UniversalFileParser;

/// 看板查询请求（均为可选，缺省取部门默认）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    pub npd_mode: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub rank_measure: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    config: EngineConfig,
}

impl DashboardApi {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// 从配置管理器组装
    pub fn from_config_manager(manager: &ConfigManager) -> ApiResult<Self> {
        Ok(Self::new(manager.engine_config()?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==========================================
    // 部门看板
    // ==========================================

    /// 部门看板
    ///
    /// # 参数
    /// - department: 部门
    /// - records: 该部门已拉取完毕的原始记录
    /// - request: 查询参数
    ///
    /// # 返回
    /// - Ok(DashboardReport): 空记录集返回全零报表
    /// - Err(ApiError): 分组字段/排名口径/Top-N 非法
    pub fn department_dashboard(
        &self,
        department: Department,
        records: &[RawRecord],
        request: &DashboardRequest,
    ) -> ApiResult<DashboardReport> {
        let profile = self.config.profile(department);
        let query = self.build_query(department, request)?;

        tracing::debug!(
            department = %department,
            record_count = records.len(),
            group_by = %query.group_by,
            top_n = query.top_n,
            "部门看板请求"
        );

        Ok(DashboardEngine::build(
            records,
            &profile,
            &query,
            self.config.cost_per_unit,
        ))
    }

    /// 按部门名称查询（CLI/外部调用入口）
    pub fn department_dashboard_by_name(
        &self,
        department: &str,
        records: &[RawRecord],
        request: &DashboardRequest,
    ) -> ApiResult<DashboardReport> {
        let department = Department::from_str(department)
            .ok_or_else(|| ApiError::UnknownDepartment(department.to_string()))?;
        self.department_dashboard(department, records, request)
    }

    // ==========================================
    // 钢材对账
    // ==========================================

    /// 钢材对账（NPD 模式宽松解析）
    pub fn steel_reconciliation(
        &self,
        records: &StageRecords,
        npd_mode: Option<&str>,
    ) -> ApiResult<ReconciliationReport> {
        let npd_mode = npd_mode.map(NpdMode::parse_or_default).unwrap_or_default();
        Ok(SteelReconciliationEngine::reconcile(
            records,
            &self.config.reconciliation,
            npd_mode,
            self.config.cost_per_unit,
        ))
    }

    // ==========================================
    // 文件加载
    // ==========================================

    /// 从导出文件加载原始记录
    pub fn load_records<P: AsRef<Path>>(&self, path: P) -> ApiResult<Vec<RawRecord>> {
        Ok(UniversalFileParser.parse(path)?)
    }

    // ==========================================
    // 参数校验
    // ==========================================

    fn build_query(&self, department: Department, request: &DashboardRequest) -> ApiResult<DashboardQuery> {
        let profile = self.config.profile(department);
        let mut query = DashboardQuery::for_profile(&profile);
        query.top_n = self.config.top_n;
        query.drop_inactive = self.config.drop_inactive_groups;

        if let Some(mode) = request.npd_mode.as_deref() {
            query.npd_mode = NpdMode::parse_or_default(mode);
        }

        if let Some(raw) = request.group_by.as_deref() {
            let field = GroupField::from_str(raw).ok_or_else(|| ApiError::InvalidGroupField {
                department,
                field: raw.to_string(),
            })?;
            if !profile.permits(field) {
                return Err(ApiError::invalid_group_field(department, field));
            }
            query.group_by = field;
        }

        if let Some(raw) = request.rank_measure.as_deref() {
            query.rank_measure = RankMeasure::from_str(raw)
                .ok_or_else(|| ApiError::InvalidInput(format!("未知排名口径: {}", raw)))?;
        }

        if let Some(top_n) = request.top_n {
            if top_n == 0 || top_n > MAX_TOP_N {
                return Err(ApiError::InvalidInput(format!(
                    "top_n 必须在 1..={} 之间，实际为 {}",
                    MAX_TOP_N, top_n
                )));
            }
            query.top_n = top_n;
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> DashboardApi {
        DashboardApi::new(EngineConfig::default())
    }

    #[test]
    fn test_default_request_uses_department_defaults() {
        let query = api()
            .build_query(Department::HeatTreatment, &DashboardRequest::default())
            .unwrap();
        assert_eq!(query.group_by, GroupField::Furnace);
        assert_eq!(query.npd_mode, NpdMode::Regular);
        assert_eq!(query.top_n, 10);
    }

    #[test]
    fn test_unknown_npd_mode_falls_back() {
        let request = DashboardRequest {
            npd_mode: Some("everything".to_string()),
            ..Default::default()
        };
        let query = api().build_query(Department::Forging, &request).unwrap();
        assert_eq!(query.npd_mode, NpdMode::Regular);
    }

    #[test]
    fn test_top_n_bounds() {
        for bad in [0, 101] {
            let request = DashboardRequest {
                top_n: Some(bad),
                ..Default::default()
            };
            let err = api().build_query(Department::Forging, &request).unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_unknown_group_field_rejected() {
        let request = DashboardRequest {
            group_by: Some("colour".to_string()),
            ..Default::default()
        };
        let err = api().build_query(Department::Forging, &request).unwrap_err();
        assert!(matches!(err, ApiError::InvalidGroupField { .. }));
    }
}
