// ==========================================
// 锻造 ERP 产量对账引擎 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / JSON (.json)
// JSON: 记录数组，或分页信封 {"results": [...]}，或信封数组（多页拼接）
// ==========================================

use crate::domain::record::RawRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord::from(row_map));
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 只读第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord::from(row_map));
        }

        Ok(records)
    }
}

// ==========================================
// JSON Parser 实现
// ==========================================
pub struct JsonParser;

impl JsonParser {
    /// 解析已读入内存的 JSON 文本
    pub fn parse_str(&self, text: &str) -> ImportResult<Vec<RawRecord>> {
        let value: Value = serde_json::from_str(text)?;
        let mut records = Vec::new();
        collect_records(value, &mut records)?;
        Ok(records)
    }
}

impl FileParser for JsonParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "json" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let text = std::fs::read_to_string(file_path)?;
        self.parse_str(&text)
    }
}

/// 展开记录数组 / 分页信封 / 信封数组
fn collect_records(value: Value, out: &mut Vec<RawRecord>) -> ImportResult<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) if is_page_envelope(&map) => {
                        collect_records(Value::Object(map), out)?;
                    }
                    Value::Object(map) => out.push(RawRecord::from(map)),
                    other => {
                        return Err(ImportError::InvalidRecordShape {
                            index: out.len(),
                            message: format!("期望 JSON 对象，实际 {}", json_kind(&other)),
                        });
                    }
                }
            }
            Ok(())
        }
        Value::Object(mut map) if is_page_envelope(&map) => match map.remove("results") {
            Some(results) => collect_records(results, out),
            None => Ok(()),
        },
        other => Err(ImportError::InvalidRecordShape {
            index: 0,
            message: format!("期望记录数组或分页信封，实际 {}", json_kind(&other)),
        }),
    }
}

fn is_page_envelope(map: &serde_json::Map<String, Value>) -> bool {
    matches!(map.get("results"), Some(Value::Array(_)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        let records = match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(path)?,
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path)?,
            "json" => JsonParser.parse_to_raw_records(path)?,
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(
            path = %path.display(),
            record_count = records.len(),
            "记录文件解析完成"
        );
        Ok(records)
    }
}
