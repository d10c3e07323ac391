// ==========================================
// 锻造 ERP 产量对账引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: 扁平 key-value JSON（与配置快照格式一致）
// 优先级: 环境变量 > 配置文件 > 内置默认值
// ==========================================

use crate::config::department_profile::DepartmentProfile;
use crate::config::reconciliation_profile::ReconciliationProfile;
use crate::domain::types::Department;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置 JSON 解析失败: {0}")]
    ParseError(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 每度电成本
    pub const COST_PER_UNIT: &str = "electricity.cost_per_unit";
    /// 看板 Top-N
    pub const TOP_N: &str = "dashboard.top_n";
    /// 是否过滤主口径为 0 的分组
    pub const DROP_INACTIVE_GROUPS: &str = "dashboard.drop_inactive_groups";
    /// 废品率告警阈值前缀: alert.rejection_threshold_pct/{department}
    pub const REJECTION_THRESHOLD_PREFIX: &str = "alert.rejection_threshold_pct";
    /// 部门口径覆写前缀: department_profile/{department}
    pub const DEPARTMENT_PROFILE_PREFIX: &str = "department_profile";
    /// 钢材对账口径覆写
    pub const RECONCILIATION_PROFILE: &str = "reconciliation_profile";

    /// 环境变量: 配置文件路径
    pub const ENV_CONFIG_PATH: &str = "STEEL_RECON_CONFIG";
    /// 环境变量: 每度电成本
    pub const ENV_COST_PER_UNIT: &str = "STEEL_RECON_COST_PER_UNIT";
}

// ===== 默认值 =====
pub const DEFAULT_COST_PER_UNIT: f64 = 8.5;
pub const DEFAULT_TOP_N: usize = 10;
/// Top-N 上限（请求参数与配置值共用）
pub const MAX_TOP_N: usize = 100;

// ==========================================
// EngineConfig - 引擎配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cost_per_unit: f64,
    pub top_n: usize,
    pub drop_inactive_groups: bool,
    pub departments: BTreeMap<Department, DepartmentProfile>,
    pub reconciliation: ReconciliationProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_per_unit: DEFAULT_COST_PER_UNIT,
            top_n: DEFAULT_TOP_N,
            drop_inactive_groups: true,
            departments: Department::ALL
                .iter()
                .map(|d| (*d, DepartmentProfile::default_for(*d)))
                .collect(),
            reconciliation: ReconciliationProfile::default(),
        }
    }
}

impl EngineConfig {
    /// 取部门口径（缺失时回落到内置默认）
    pub fn profile(&self, department: Department) -> DepartmentProfile {
        self.departments
            .get(&department)
            .cloned()
            .unwrap_or_else(|| DepartmentProfile::default_for(department))
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 key-value 表创建
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 从 JSON 文本加载
    ///
    /// 格式: `{"electricity.cost_per_unit": "9.2", "dashboard.top_n": "5"}`
    /// 非字符串值会被序列化为 JSON 文本存储（便于直接写入口径覆写对象）
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let values = raw
            .into_iter()
            .map(|(k, v)| {
                let s = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, s)
            })
            .collect();

        Ok(Self { values })
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), keys = manager.values.len(), "配置文件已加载");
        Ok(manager)
    }

    /// 按环境变量/默认路径加载；文件不存在时使用默认配置
    pub fn load_default() -> ConfigResult<Self> {
        let path = match std::env::var(config_keys::ENV_CONFIG_PATH) {
            Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p.trim())),
            _ => default_config_path(),
        };

        match path {
            Some(p) if p.exists() => Self::from_file(p),
            _ => {
                tracing::debug!("未找到配置文件，使用内置默认配置");
                Ok(Self::new())
            }
        }
    }

    /// 设置单个配置（测试与覆写）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn parse_value<T: std::str::FromStr>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    fn parse_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> ConfigResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    // ===== 成本配置 =====

    /// 每度电成本（环境变量优先）
    pub fn get_cost_per_unit(&self) -> ConfigResult<f64> {
        if let Ok(raw) = std::env::var(config_keys::ENV_COST_PER_UNIT) {
            let value = raw.trim().parse::<f64>().map_err(|e| ConfigError::InvalidValue {
                key: config_keys::ENV_COST_PER_UNIT.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            })?;
            return check_non_negative(config_keys::ENV_COST_PER_UNIT, value);
        }
        let value = self.parse_value(config_keys::COST_PER_UNIT, DEFAULT_COST_PER_UNIT)?;
        check_non_negative(config_keys::COST_PER_UNIT, value)
    }

    // ===== 看板配置 =====

    pub fn get_top_n(&self) -> ConfigResult<usize> {
        let value = self.parse_value(config_keys::TOP_N, DEFAULT_TOP_N)?;
        if value == 0 || value > MAX_TOP_N {
            return Err(ConfigError::InvalidValue {
                key: config_keys::TOP_N.to_string(),
                value: value.to_string(),
                message: format!("Top-N 必须在 1..={} 之间", MAX_TOP_N),
            });
        }
        Ok(value)
    }

    pub fn get_drop_inactive_groups(&self) -> ConfigResult<bool> {
        match self.get(config_keys::DROP_INACTIVE_GROUPS) {
            None => Ok(true),
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "on" => Ok(true),
                "0" | "false" | "no" | "n" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    key: config_keys::DROP_INACTIVE_GROUPS.to_string(),
                    value: raw.to_string(),
                    message: "期望布尔值".to_string(),
                }),
            },
        }
    }

    /// 部门废品率告警阈值（%）
    pub fn get_rejection_threshold(&self, department: Department) -> ConfigResult<Option<f64>> {
        let key = format!(
            "{}/{}",
            config_keys::REJECTION_THRESHOLD_PREFIX,
            department.as_key()
        );
        match self.get(&key) {
            None => Ok(None),
            Some(_) => {
                let value = self.parse_value(&key, 0.0)?;
                check_non_negative(&key, value).map(Some)
            }
        }
    }

    // ===== 口径配置 =====

    /// 部门口径（覆写 > 内置默认），阈值覆写最后应用
    pub fn get_department_profile(&self, department: Department) -> ConfigResult<DepartmentProfile> {
        let key = format!(
            "{}/{}",
            config_keys::DEPARTMENT_PROFILE_PREFIX,
            department.as_key()
        );
        let mut profile = self
            .parse_json::<DepartmentProfile>(&key)?
            .unwrap_or_else(|| DepartmentProfile::default_for(department));

        if profile.department != department {
            return Err(ConfigError::InvalidValue {
                key,
                value: profile.department.to_string(),
                message: "口径表中的部门与配置键不一致".to_string(),
            });
        }
        if !profile.permits(profile.default_group_field) {
            return Err(ConfigError::InvalidValue {
                key,
                value: profile.default_group_field.to_string(),
                message: "默认分组字段不在允许集合内".to_string(),
            });
        }

        if let Some(threshold) = self.get_rejection_threshold(department)? {
            profile.rejection_alert_threshold_pct = threshold;
        }
        Ok(profile)
    }

    pub fn get_reconciliation_profile(&self) -> ConfigResult<ReconciliationProfile> {
        Ok(self
            .parse_json::<ReconciliationProfile>(config_keys::RECONCILIATION_PROFILE)?
            .unwrap_or_default())
    }

    /// 组装引擎配置快照
    pub fn engine_config(&self) -> ConfigResult<EngineConfig> {
        let mut departments = BTreeMap::new();
        for department in Department::ALL {
            departments.insert(department, self.get_department_profile(department)?);
        }

        Ok(EngineConfig {
            cost_per_unit: self.get_cost_per_unit()?,
            top_n: self.get_top_n()?,
            drop_inactive_groups: self.get_drop_inactive_groups()?,
            departments,
            reconciliation: self.get_reconciliation_profile()?,
        })
    }

    /// 当前配置快照（JSON，按 key 排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let sorted: BTreeMap<&String, &String> = self.values.iter().collect();
        serde_json::to_string(&sorted).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

fn check_non_negative(key: &str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "必须为非负有限数".to_string(),
        })
    }
}

/// 默认配置文件路径: {config_dir}/steel-recon/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("steel-recon").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::GroupField;

    #[test]
    fn test_defaults() {
        let manager = ConfigManager::new();
        assert_eq!(manager.get_top_n().unwrap(), DEFAULT_TOP_N);
        assert!(manager.get_drop_inactive_groups().unwrap());
        assert_eq!(manager.get_rejection_threshold(Department::Forging).unwrap(), None);
    }

    #[test]
    fn test_invalid_top_n() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::TOP_N, "ten");
        assert!(matches!(
            manager.get_top_n(),
            Err(ConfigError::InvalidValue { .. })
        ));
        manager.set(config_keys::TOP_N, "0");
        assert!(manager.get_top_n().is_err());

        manager.set(config_keys::TOP_N, "1000");
        assert!(matches!(
            manager.get_top_n(),
            Err(ConfigError::InvalidValue { .. })
        ));

        manager.set(config_keys::TOP_N, "100");
        assert_eq!(manager.get_top_n().unwrap(), MAX_TOP_N);
    }

    #[test]
    fn test_threshold_override_applied_to_profile() {
        let mut manager = ConfigManager::new();
        manager.set("alert.rejection_threshold_pct/visual", "3.5");
        let profile = manager.get_department_profile(Department::Visual).unwrap();
        assert_eq!(profile.rejection_alert_threshold_pct, 3.5);

        let forging = manager.get_department_profile(Department::Forging).unwrap();
        assert_eq!(forging.rejection_alert_threshold_pct, 2.0);
    }

    #[test]
    fn test_profile_override_from_json_object() {
        let text = r#"{
            "department_profile/marking": {
                "department": "marking",
                "production_field": "marked",
                "rejection_fields": ["smudge"],
                "group_fields": ["component"],
                "default_group_field": "component"
            }
        }"#;
        let manager = ConfigManager::from_json_str(text).unwrap();
        let profile = manager.get_department_profile(Department::Marking).unwrap();
        assert_eq!(profile.production_field, "marked");
        assert_eq!(profile.group_fields, vec![GroupField::Component]);
    }

    #[test]
    fn test_profile_department_mismatch_rejected() {
        let text = r#"{
            "department_profile/marking": {
                "department": "forging",
                "production_field": "marked",
                "group_fields": ["component"],
                "default_group_field": "component"
            }
        }"#;
        let manager = ConfigManager::from_json_str(text).unwrap();
        assert!(manager.get_department_profile(Department::Marking).is_err());
    }

    #[test]
    fn test_drop_inactive_flag_parsing() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::DROP_INACTIVE_GROUPS, "off");
        assert!(!manager.get_drop_inactive_groups().unwrap());
        manager.set(config_keys::DROP_INACTIVE_GROUPS, "maybe");
        assert!(manager.get_drop_inactive_groups().is_err());
    }

    #[test]
    fn test_snapshot_sorted() {
        let mut manager = ConfigManager::new();
        manager.set("b", "2");
        manager.set("a", "1");
        assert_eq!(manager.get_config_snapshot().unwrap(), r#"{"a":"1","b":"2"}"#);
    }
}
