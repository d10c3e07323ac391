// ==========================================
// 锻造 ERP 产量对账引擎 - 记录归一化器
// ==========================================
// 输入: RawRecord（REST 原样 JSON）
// 输出: NormalizedRecord
// 口径: 缺失 / null / 空串 / 非数值 → 0，永不报错
// ==========================================

use crate::config::department_profile::DepartmentProfile;
use crate::domain::record::{is_npd_component, NormalizedRecord, RawRecord};
use crate::domain::types::GroupField;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::DataCleaner as _;
use serde_json::Value;
use std::collections::BTreeMap;

// ==========================================
// RecordNormalizer - 记录归一化器
// ==========================================
// 无状态: 仅持有需要强转的数值字段列表
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    numeric_fields: Vec<String>,
}

impl RecordNormalizer {
    pub fn new<I, S>(numeric_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            numeric_fields: numeric_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// 按部门口径表收集数值字段
    pub fn for_profile(profile: &DepartmentProfile) -> Self {
        Self::new(profile.numeric_fields())
    }

    pub fn numeric_fields(&self) -> &[String] {
        &self.numeric_fields
    }

    /// 归一化单条记录
    pub fn normalize(&self, record: &RawRecord) -> NormalizedRecord {
        let cleaner = DataCleaner;

        // 1. 分类字段（按别名顺序取第一个非空值）
        let mut attributes = BTreeMap::new();
        for field in GroupField::ALL {
            let value = field
                .source_keys()
                .iter()
                .find_map(|key| cleaner.coerce_text(record.get(key)));
            if let Some(mut value) = value {
                if field == GroupField::Shift {
                    value = value.to_lowercase();
                }
                attributes.insert(field, value);
            }
        }

        // 2. NPD 标记（按原始值判断后缀，"X-NPD " 不算）
        let is_npd = raw_component(record).map(is_npd_component).unwrap_or(false);

        // 3. 日期
        let date = attributes
            .get(&GroupField::Date)
            .and_then(|d| cleaner.parse_date(d));

        // 4. 数值字段
        let mut measures = BTreeMap::new();
        let mut defaulted_fields = 0;
        for field in &self.numeric_fields {
            let value = match cleaner.coerce_number(record.get(field)) {
                Some(v) => v,
                None => {
                    defaulted_fields += 1;
                    0.0
                }
            };
            measures.insert(field.clone(), value);
        }

        NormalizedRecord {
            attributes,
            is_npd,
            date,
            measures,
            defaulted_fields,
        }
    }

    /// 批量归一化，并输出数据质量摘要
    pub fn normalize_all(&self, records: &[RawRecord]) -> Vec<NormalizedRecord> {
        let normalized: Vec<NormalizedRecord> = records.iter().map(|r| self.normalize(r)).collect();

        let defaulted: usize = normalized.iter().map(|r| r.defaulted_fields).sum();
        let undated = normalized.iter().filter(|r| r.date.is_none()).count();
        tracing::debug!(
            record_count = normalized.len(),
            numeric_field_count = self.numeric_fields.len(),
            defaulted_values = defaulted,
            undated_records = undated,
            "记录归一化完成"
        );

        normalized
    }
}

/// 第一个非空白的原始组件值（未 TRIM）
fn raw_component(record: &RawRecord) -> Option<&str> {
    GroupField::Component.source_keys().iter().find_map(|key| match record.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::new(["production", "slug_weight"])
    }

    #[test]
    fn test_zero_default_policy() {
        let n = normalizer();
        let cases: Vec<Option<Value>> = vec![
            None,
            Some(Value::Null),
            Some(json!("")),
            Some(json!("abc")),
            Some(json!({"nested": 1})),
        ];
        for case in cases {
            let mut raw = RawRecord::new().with("component", "A");
            if let Some(v) = case {
                raw.insert("production", v);
            }
            let rec = n.normalize(&raw);
            assert_eq!(rec.measure("production"), 0.0);
            assert!(rec.defaulted_fields >= 1);
        }
    }

    #[test]
    fn test_numeric_strings_coerced() {
        let raw = RawRecord::new()
            .with("production", " 120 ")
            .with("slug_weight", 2.5);
        let rec = normalizer().normalize(&raw);
        assert_eq!(rec.measure("production"), 120.0);
        assert_eq!(rec.measure("slug_weight"), 2.5);
        assert_eq!(rec.defaulted_fields, 0);
    }

    #[test]
    fn test_npd_flag_and_attributes() {
        let raw = RawRecord::new()
            .with("component", "  RING-40-NPD")
            .with("shift", "Night")
            .with("heat_number", "H-77")
            .with("date", "2025-02-03")
            .with("line", "");
        let rec = normalizer().normalize(&raw);
        assert!(rec.is_npd);
        assert_eq!(rec.component(), Some("RING-40-NPD"));
        assert_eq!(rec.group_key(GroupField::Shift), Some("night"));
        assert_eq!(rec.group_key(GroupField::HeatNo), Some("H-77"));
        assert_eq!(rec.group_key(GroupField::Line), None);
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2025, 2, 3));
    }

    #[test]
    fn test_trailing_space_after_npd_suffix_is_regular() {
        let rec = normalizer().normalize(&RawRecord::new().with("component", "X-NPD "));
        assert!(!rec.is_npd);
        assert_eq!(rec.component(), Some("X-NPD"));
    }

    #[test]
    fn test_lowercase_npd_suffix_is_regular() {
        let raw = RawRecord::new().with("component", "RING-40-npd");
        assert!(!normalizer().normalize(&raw).is_npd);
    }

    #[test]
    fn test_heat_no_preferred_over_alias() {
        let raw = RawRecord::new()
            .with("heat_no", "H-1")
            .with("heat_number", "H-2");
        let rec = normalizer().normalize(&raw);
        assert_eq!(rec.group_key(GroupField::HeatNo), Some("H-1"));
    }
}
