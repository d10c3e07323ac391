// ==========================================
// 锻造 ERP 产量对账引擎 - API 层错误类型
// ==========================================
// 职责: 统一查询参数校验错误，并承接导入层/配置层错误
// 说明: 空数据集不是错误，引擎层永不失败
// ==========================================

use crate::config::config_manager::ConfigError;
use crate::domain::types::{Department, GroupField};
use crate::importer::error::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 参数校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("部门 {department} 不支持按 {field} 分组")]
    InvalidGroupField { department: Department, field: String },

    #[error("未知部门: {0}")]
    UnknownDepartment(String),

    // ==========================================
    // 下层错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid_group_field(department: Department, field: GroupField) -> Self {
        ApiError::InvalidGroupField {
            department,
            field: field.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::invalid_group_field(Department::Forging, GroupField::Furnace);
        let msg = err.to_string();
        assert!(msg.contains("furnace"));

        let err = ApiError::InvalidInput("top_n=0".to_string());
        assert_eq!(err.to_string(), "无效输入: top_n=0");
    }

    #[test]
    fn test_from_import_error() {
        let err: ApiError = ImportError::UnsupportedFormat("txt".to_string()).into();
        assert!(matches!(err, ApiError::Import(_)));
    }
}
