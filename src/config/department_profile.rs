// ==========================================
// 锻造 ERP 产量对账引擎 - 部门口径表
// ==========================================
// 职责: 每个部门一张口径表（产量/目标/缺陷/返工/重量/金额/能耗字段）
// 可被 config_kv 中的 department_profile/{department} 覆写
// ==========================================

use crate::domain::measure::MeasureFormula;
use crate::domain::types::{Department, GroupField, PrimaryMeasure};
use serde::{Deserialize, Serialize};

/// 默认废品率告警阈值（%）
pub const DEFAULT_REJECTION_ALERT_THRESHOLD_PCT: f64 = 2.0;

/// 部门口径表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentProfile {
    pub department: Department,

    /// 产量字段
    pub production_field: String,

    /// 目标字段（无目标的部门为 None）
    #[serde(default)]
    pub target_field: Option<String>,

    /// 缺陷子字段（废品 = 各字段之和）
    #[serde(default)]
    pub rejection_fields: Vec<String>,

    /// 返工子字段
    #[serde(default)]
    pub rework_fields: Vec<String>,

    /// 单条记录重量公式（kg）
    #[serde(default)]
    pub weight: MeasureFormula,

    /// 单条记录金额公式
    #[serde(default)]
    pub cost: MeasureFormula,

    /// 能耗字段（度）
    #[serde(default)]
    pub unit_field: Option<String>,

    /// 能耗去重键字段（有序）
    #[serde(default)]
    pub unit_key_fields: Vec<GroupField>,

    /// 允许的分组字段（封闭集合）
    pub group_fields: Vec<GroupField>,

    /// 默认分组字段
    pub default_group_field: GroupField,

    /// 过滤不活跃分组时使用的口径
    #[serde(default)]
    pub primary_measure: PrimaryMeasure,

    /// 废品率告警阈值（%，严格大于触发）
    #[serde(default = "default_threshold")]
    pub rejection_alert_threshold_pct: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_REJECTION_ALERT_THRESHOLD_PCT
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl DepartmentProfile {
    /// 内置默认口径表
    pub fn default_for(department: Department) -> Self {
        match department {
            Department::Forging => Self::forging(),
            Department::HeatTreatment => Self::heat_treatment(),
            Department::PreMachining => Self::pre_machining(),
            Department::Machining => Self::machining(),
            Department::FinalInspection => Self::final_inspection(),
            Department::Marking => Self::marking(),
            Department::Visual => Self::visual(),
            Department::Dispatch => Self::dispatch(),
            Department::RawMaterial => Self::raw_material(),
        }
    }

    /// 分组字段是否在允许集合内
    pub fn permits(&self, field: GroupField) -> bool {
        self.group_fields.contains(&field)
    }

    /// 归一化器需要强转的全部数值字段（去重，保持声明顺序）
    pub fn numeric_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        };

        push(&self.production_field);
        if let Some(target) = &self.target_field {
            push(target);
        }
        for f in &self.rejection_fields {
            push(f);
        }
        for f in &self.rework_fields {
            push(f);
        }
        for f in self.weight.fields() {
            push(f);
        }
        for f in self.cost.fields() {
            push(f);
        }
        if let Some(unit) = &self.unit_field {
            push(unit);
        }
        fields
    }

    // ==========================================
    // 各部门默认口径
    // ==========================================

    fn forging() -> Self {
        Self {
            department: Department::Forging,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&[
                "up_setting",
                "half_piercing",
                "full_piercing",
                "ring_rolling",
                "sizing",
                "overheat",
                "bar_crack_pcs",
            ]),
            rework_fields: strings(&["rework"]),
            weight: MeasureFormula::product("slug_weight", "production"),
            cost: MeasureFormula::Zero,
            unit_field: Some("consumed_units".to_string()),
            unit_key_fields: vec![
                GroupField::Date,
                GroupField::Shift,
                GroupField::Line,
                GroupField::Process,
            ],
            group_fields: vec![
                GroupField::Component,
                GroupField::Customer,
                GroupField::Line,
                GroupField::Shift,
                GroupField::Date,
                GroupField::BatchNumber,
                GroupField::HeatNo,
                GroupField::ShopFloor,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn heat_treatment() -> Self {
        Self {
            department: Department::HeatTreatment,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&["hardness_ng", "ht_crack", "distortion"]),
            rework_fields: strings(&["rehardening", "retempering"]),
            weight: MeasureFormula::product("slug_weight", "production"),
            cost: MeasureFormula::Zero,
            unit_field: Some("consumed_units".to_string()),
            unit_key_fields: vec![
                GroupField::Date,
                GroupField::Shift,
                GroupField::Furnace,
                GroupField::Process,
            ],
            group_fields: vec![
                GroupField::Component,
                GroupField::Furnace,
                GroupField::Process,
                GroupField::Shift,
                GroupField::Date,
                GroupField::BatchNumber,
                GroupField::HeatNo,
                GroupField::Customer,
            ],
            default_group_field: GroupField::Furnace,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn pre_machining() -> Self {
        Self {
            department: Department::PreMachining,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&["pre_mc_bore", "pre_mc_od", "pre_mc_face", "forging_defect"]),
            rework_fields: strings(&["rework"]),
            weight: MeasureFormula::product("slug_weight", "production"),
            cost: MeasureFormula::Zero,
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Component,
                GroupField::Machine,
                GroupField::Shift,
                GroupField::Date,
                GroupField::Customer,
                GroupField::HeatNo,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn machining() -> Self {
        Self {
            department: Department::Machining,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&[
                "cnc_bore",
                "cnc_od",
                "cnc_face",
                "cnc_chamfer",
                "cnc_groove",
                "forging_defect",
            ]),
            rework_fields: strings(&["rework_bore", "rework_od", "rework_face"]),
            weight: MeasureFormula::product("finish_weight", "production"),
            cost: MeasureFormula::Zero,
            unit_field: Some("consumed_units".to_string()),
            unit_key_fields: vec![
                GroupField::Date,
                GroupField::Shift,
                GroupField::Line,
                GroupField::Process,
            ],
            group_fields: vec![
                GroupField::Component,
                GroupField::Machine,
                GroupField::Line,
                GroupField::ShopFloor,
                GroupField::Shift,
                GroupField::Date,
                GroupField::Customer,
                GroupField::HeatNo,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn final_inspection() -> Self {
        Self {
            department: Department::FinalInspection,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&[
                "forging_crack",
                "lap",
                "pit",
                "dent",
                "scale",
                "cnc_bore",
                "cnc_od",
                "cnc_face",
                "ht_hardness",
            ]),
            rework_fields: strings(&["rework_forging", "rework_cnc"]),
            weight: MeasureFormula::product("finish_weight", "production"),
            cost: MeasureFormula::Zero,
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Component,
                GroupField::Customer,
                GroupField::Shift,
                GroupField::Date,
                GroupField::BatchNumber,
                GroupField::HeatNo,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn marking() -> Self {
        Self {
            department: Department::Marking,
            production_field: "production".to_string(),
            target_field: Some("target".to_string()),
            rejection_fields: strings(&["wrong_marking", "missing_marking", "double_marking"]),
            rework_fields: strings(&["remarking"]),
            weight: MeasureFormula::Zero,
            cost: MeasureFormula::Zero,
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Component,
                GroupField::Customer,
                GroupField::Machine,
                GroupField::Shift,
                GroupField::Date,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn visual() -> Self {
        Self {
            department: Department::Visual,
            production_field: "production".to_string(),
            target_field: None,
            rejection_fields: strings(&["crack", "lap", "pit", "dent", "scale", "underfill"]),
            rework_fields: strings(&["grinding"]),
            weight: MeasureFormula::Zero,
            cost: MeasureFormula::Zero,
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Component,
                GroupField::Customer,
                GroupField::Shift,
                GroupField::Date,
                GroupField::HeatNo,
                GroupField::BatchNumber,
            ],
            default_group_field: GroupField::Component,
            primary_measure: PrimaryMeasure::Rejection,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn dispatch() -> Self {
        Self {
            department: Department::Dispatch,
            production_field: "dispatched".to_string(),
            target_field: Some("order_quantity".to_string()),
            rejection_fields: Vec::new(),
            rework_fields: Vec::new(),
            weight: MeasureFormula::product("unit_weight", "dispatched"),
            cost: MeasureFormula::product("price", "dispatched"),
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Component,
                GroupField::Customer,
                GroupField::InvoiceNo,
                GroupField::Date,
                GroupField::HeatNo,
            ],
            default_group_field: GroupField::Customer,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }

    fn raw_material() -> Self {
        Self {
            department: Department::RawMaterial,
            production_field: "bars".to_string(),
            target_field: None,
            rejection_fields: Vec::new(),
            rework_fields: Vec::new(),
            weight: MeasureFormula::field("weight"),
            cost: MeasureFormula::product("rate", "weight"),
            unit_field: None,
            unit_key_fields: Vec::new(),
            group_fields: vec![
                GroupField::Supplier,
                GroupField::Grade,
                GroupField::HeatNo,
                GroupField::InvoiceNo,
                GroupField::Date,
            ],
            default_group_field: GroupField::Supplier,
            primary_measure: PrimaryMeasure::Production,
            rejection_alert_threshold_pct: DEFAULT_REJECTION_ALERT_THRESHOLD_PCT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_department_has_a_profile() {
        for department in Department::ALL {
            let profile = DepartmentProfile::default_for(department);
            assert_eq!(profile.department, department);
            assert!(profile.permits(profile.default_group_field));
        }
    }

    #[test]
    fn test_numeric_fields_are_deduplicated() {
        let profile = DepartmentProfile::default_for(Department::Dispatch);
        let fields = profile.numeric_fields();
        assert_eq!(fields.iter().filter(|f| *f == "dispatched").count(), 1);
        assert!(fields.contains(&"price".to_string()));
        assert!(fields.contains(&"unit_weight".to_string()));
    }

    #[test]
    fn test_heat_treatment_dedups_by_furnace() {
        let profile = DepartmentProfile::default_for(Department::HeatTreatment);
        assert!(profile.unit_key_fields.contains(&GroupField::Furnace));
        assert_eq!(profile.unit_field.as_deref(), Some("consumed_units"));
    }

    #[test]
    fn test_profile_json_override_uses_defaults() {
        let json = r#"{
            "department": "forging",
            "production_field": "qty",
            "rejection_fields": ["crack"],
            "group_fields": ["component", "line"],
            "default_group_field": "component"
        }"#;
        let profile: DepartmentProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.weight, MeasureFormula::Zero);
        assert_eq!(profile.rejection_alert_threshold_pct, 2.0);
        assert_eq!(profile.primary_measure, PrimaryMeasure::Production);
        assert!(!profile.permits(GroupField::Furnace));
    }
}
