// ==========================================
// 锻造 ERP 产量对账引擎 - 导入层
// ==========================================
// 职责: 从导出文件加载原始记录，字段清洗工具
// 支持: Excel, CSV, JSON（含分页信封）
// 说明: 不负责 REST 拉取与分页遍历
// ==========================================

pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, JsonParser, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FileParser};
