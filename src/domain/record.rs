// ==========================================
// 锻造 ERP 产量对账引擎 - 生产记录
// ==========================================
// RawRecord: REST 接口返回的扁平 JSON 对象（原样）
// NormalizedRecord: 归一化后的强类型视图
// ==========================================

use crate::domain::types::GroupField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// NPD 件的组件名后缀（大小写敏感）
pub const NPD_SUFFIX: &str = "-NPD";

/// 空分组键的显示名
pub const UNKNOWN_KEY: &str = "Unknown";

// ==========================================
// RawRecord - 原始记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// 链式设置字段（测试与导入时使用）
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 文件导入得到的是字符串表格行
impl From<HashMap<String, String>> for RawRecord {
    fn from(row: HashMap<String, String>) -> Self {
        Self(
            row.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }
}

// ==========================================
// NormalizedRecord - 归一化记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// 分类字段（已 TRIM，空值不入表）
    pub attributes: BTreeMap<GroupField, String>,

    /// 组件名以 -NPD 结尾
    pub is_npd: bool,

    /// 解析成功的日期
    pub date: Option<NaiveDate>,

    /// 已配置数值字段（缺失/非法 → 0）
    pub measures: BTreeMap<String, f64>,

    /// 本条记录被置零的数值字段个数（数据质量统计）
    #[serde(default)]
    pub defaulted_fields: usize,
}

impl NormalizedRecord {
    /// 读取数值字段；未配置的字段视为 0
    pub fn measure(&self, field: &str) -> f64 {
        self.measures.get(field).copied().unwrap_or(0.0)
    }

    /// 按分组字段取值
    pub fn group_key(&self, field: GroupField) -> Option<&str> {
        self.attributes.get(&field).map(String::as_str)
    }

    /// 分组键，空值归入 "Unknown"
    pub fn group_key_or_unknown(&self, field: GroupField) -> &str {
        self.group_key(field).unwrap_or(UNKNOWN_KEY)
    }

    pub fn component(&self) -> Option<&str> {
        self.group_key(GroupField::Component)
    }
}

/// 判断组件是否为 NPD 件
pub fn is_npd_component(component: &str) -> bool {
    component.ends_with(NPD_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_npd_component_case_sensitive() {
        assert!(is_npd_component("FLANGE-12-NPD"));
        assert!(!is_npd_component("FLANGE-12-npd"));
        assert!(!is_npd_component("NPD-FLANGE"));
        assert!(!is_npd_component(""));
    }

    #[test]
    fn test_measure_defaults_to_zero() {
        let record = NormalizedRecord::default();
        assert_eq!(record.measure("production"), 0.0);
        assert_eq!(record.group_key_or_unknown(GroupField::Line), UNKNOWN_KEY);
    }

    #[test]
    fn test_raw_record_from_string_row() {
        let mut row = HashMap::new();
        row.insert("component".to_string(), "A".to_string());
        let record = RawRecord::from(row);
        assert_eq!(record.get("component"), Some(&Value::String("A".to_string())));
    }
}
