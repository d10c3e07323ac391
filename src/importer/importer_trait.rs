// ==========================================
// 锻造 ERP 产量对账引擎 - 导入接口定义
// ==========================================
// 职责: 文件解析与字段清洗的接口（不包含实现）
// ==========================================

use crate::domain::record::RawRecord;
use crate::importer::error::ImportResult;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser / ExcelParser / JsonParser
pub trait FileParser {
    /// 将文件解析为原始记录（跳过完全空白行）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 实现者: DataCleaner
// 红线: 清洗函数不报错，非法值降级为 None
pub trait DataCleaner {
    /// TRIM（可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 空白字符串视为 NULL
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 数值强转：数字或数字字符串 → Some，其余 → None
    fn coerce_number(&self, value: Option<&Value>) -> Option<f64>;

    /// 分类字段转文本：字符串 TRIM，数字转字符串，其余 → None
    fn coerce_text(&self, value: Option<&Value>) -> Option<String>;

    /// 日期解析（多种常见格式）
    fn parse_date(&self, value: &str) -> Option<NaiveDate>;
}
