// ==========================================
// 锻造 ERP 产量对账引擎 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值强转 / 日期解析
// 口径: 缺失、null、空串、非数值一律视为缺失，由调用方置 0
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn coerce_number(&self, value: Option<&Value>) -> Option<f64> {
        let number = match value? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            // bool / array / object / null 不参与计算
            _ => return None,
        };
        if number.is_finite() {
            Some(number)
        } else {
            None
        }
    }

    fn coerce_text(&self, value: Option<&Value>) -> Option<String> {
        match value? {
            Value::String(s) => self.normalize_null(Some(s.clone())),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
            .or_else(|_| NaiveDate::parse_from_str(value, "%d-%m-%Y"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
    }
}

impl DataCleaner {
    /// 数值字段强转，缺失/非法 → 0
    pub fn number_or_zero(&self, value: Option<&Value>) -> f64 {
        self.coerce_number(value).unwrap_or(0.0)
    }

    /// 炉号等连接键：TRIM + UPPER，空值 → None
    pub fn clean_join_key(&self, value: Option<&str>) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(v, true)))
    }
}
