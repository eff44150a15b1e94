// ==========================================
// 班次 OEE 管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::oee_config_trait::OeeConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::OeeThresholds;
use crate::engine::oee_calculator::DEFAULT_NOMINAL_SHIFT_HOURS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置层 Result 别名
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;

        tracing::info!(config_key = key, value = value.trim(), "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置（按键排序）
    pub fn list_global_configs(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 读取浮点配置，格式错误时使用默认值并告警
    fn get_f64_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值 {}", default);
                Ok(default)
            }
        }
    }
}

// ==========================================
// OeeConfigReader Trait 实现
// ==========================================
#[async_trait]
impl OeeConfigReader for ConfigManager {
    async fn get_nominal_shift_hours(&self) -> ConfigResult<f64> {
        let hours =
            self.get_f64_or_default(config_keys::NOMINAL_SHIFT_HOURS, DEFAULT_NOMINAL_SHIFT_HOURS)?;
        if hours <= 0.0 {
            tracing::warn!(
                config_key = config_keys::NOMINAL_SHIFT_HOURS,
                value = hours,
                "名义班长必须大于 0，使用默认值"
            );
            return Ok(DEFAULT_NOMINAL_SHIFT_HOURS);
        }
        Ok(hours)
    }

    async fn get_oee_thresholds(&self) -> ConfigResult<OeeThresholds> {
        let defaults = OeeThresholds::default();
        let thresholds = OeeThresholds {
            excellent: self.get_f64_or_default(config_keys::OEE_THRESHOLD_EXCELLENT, defaults.excellent)?,
            good: self.get_f64_or_default(config_keys::OEE_THRESHOLD_GOOD, defaults.good)?,
            warning: self.get_f64_or_default(config_keys::OEE_THRESHOLD_WARNING, defaults.warning)?,
        };

        // 阈值需单调: excellent >= good >= warning
        if !(thresholds.excellent >= thresholds.good && thresholds.good >= thresholds.warning) {
            tracing::warn!(?thresholds, "OEE 等级阈值非单调，使用默认值");
            return Ok(defaults);
        }
        Ok(thresholds)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 名义班长 (小时)
    pub const NOMINAL_SHIFT_HOURS: &str = "nominal_shift_hours";

    // OEE 等级阈值 (%)
    pub const OEE_THRESHOLD_EXCELLENT: &str = "oee_threshold_excellent";
    pub const OEE_THRESHOLD_GOOD: &str = "oee_threshold_good";
    pub const OEE_THRESHOLD_WARNING: &str = "oee_threshold_warning";
}
