// ==========================================
// 锻造 ERP 产量对账引擎 - 钢材对账口径
// ==========================================
// 四个阶段各自的重量/金额/能耗口径
// 可被 config_kv 中的 reconciliation_profile 覆写
// ==========================================

use crate::domain::measure::MeasureFormula;
use crate::domain::types::GroupField;
use serde::{Deserialize, Serialize};

/// 单阶段口径
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageProfile {
    /// 重量公式（kg）
    #[serde(default)]
    pub weight: MeasureFormula,

    /// 金额公式
    #[serde(default)]
    pub value: MeasureFormula,

    /// 能耗字段（仅生产阶段使用）
    #[serde(default)]
    pub unit_field: Option<String>,

    #[serde(default)]
    pub unit_key_fields: Vec<GroupField>,
}

impl StageProfile {
    pub fn numeric_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let names = self
            .weight
            .fields()
            .into_iter()
            .chain(self.value.fields())
            .chain(self.unit_field.as_deref());
        for name in names {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        }
        fields
    }
}

/// 钢材对账口径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationProfile {
    pub raw_material: StageProfile,
    pub planned: StageProfile,
    pub production: StageProfile,
    pub dispatch: StageProfile,
}

impl Default for ReconciliationProfile {
    fn default() -> Self {
        Self {
            raw_material: StageProfile {
                weight: MeasureFormula::field("weight"),
                value: MeasureFormula::product("rate", "weight"),
                ..Default::default()
            },
            planned: StageProfile {
                weight: MeasureFormula::product("slug_weight", "planned_quantity"),
                ..Default::default()
            },
            production: StageProfile {
                weight: MeasureFormula::product("slug_weight", "production"),
                value: MeasureFormula::Zero,
                unit_field: Some("consumed_units".to_string()),
                unit_key_fields: vec![
                    GroupField::Date,
                    GroupField::Shift,
                    GroupField::Line,
                    GroupField::Process,
                ],
            },
            dispatch: StageProfile {
                weight: MeasureFormula::product("unit_weight", "dispatched"),
                value: MeasureFormula::product("price", "dispatched"),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_numeric_fields() {
        let profile = ReconciliationProfile::default();
        assert_eq!(
            profile.production.numeric_fields(),
            vec!["slug_weight", "production", "consumed_units"]
        );
        assert_eq!(profile.raw_material.numeric_fields(), vec!["weight", "rate"]);
    }

    #[test]
    fn test_partial_override_deserializes() {
        let json = r#"{
            "raw_material": {"weight": {"kind": "field", "field": "net_weight"}},
            "planned": {},
            "production": {"weight": {"kind": "product", "left": "slug_weight", "right": "qty"}},
            "dispatch": {}
        }"#;
        let profile: ReconciliationProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.raw_material.weight, MeasureFormula::field("net_weight"));
        assert_eq!(profile.dispatch.weight, MeasureFormula::Zero);
        assert!(profile.production.unit_field.is_none());
    }
}
