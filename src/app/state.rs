// ==========================================
// 班次 OEE 管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AreaApi, DashboardApi, ExportApi, ShiftRecordApi};
use crate::config::{ConfigManager, OeeConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::OeeCalculator;
use crate::repository::{AreaRepository, ShiftRecordRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源, 所有仓储共享同一连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub area_api: Arc<AreaApi>,
    pub shift_record_api: Arc<ShiftRecordApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub export_api: Arc<ExportApi>,

    /// 配置管理器（用于 config 命令）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并建表（幂等）
    /// 2. 读取名义班长与 OEE 等级阈值
    /// 3. 创建所有API实例
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let area_repo = Arc::new(AreaRepository::from_connection(conn.clone()));
        let record_repo = Arc::new(ShiftRecordRepository::from_connection(conn.clone()));

        // ==========================================
        // 读取配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let nominal_shift_hours = config_manager
            .get_nominal_shift_hours()
            .await
            .map_err(|e| format!("读取名义班长失败: {}", e))?;
        let thresholds = config_manager
            .get_oee_thresholds()
            .await
            .map_err(|e| format!("读取OEE阈值失败: {}", e))?;

        let calculator = OeeCalculator::with_nominal_shift_hours(nominal_shift_hours);

        // ==========================================
        // 初始化API层
        // ==========================================
        let area_api = Arc::new(AreaApi::new(area_repo.clone()));
        let shift_record_api = Arc::new(ShiftRecordApi::new(
            area_repo.clone(),
            record_repo.clone(),
            calculator,
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            area_repo.clone(),
            record_repo.clone(),
            thresholds,
        ));
        let export_api = Arc::new(ExportApi::new(area_repo, record_repo));

        tracing::info!(nominal_shift_hours, ?thresholds, "AppState初始化完成");

        Ok(Self {
            db_path,
            area_api,
            shift_record_api,
            dashboard_api,
            export_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHIFT_OEE_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SHIFT_OEE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shift_oee.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("shift-oee");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shift_oee.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[tokio::test]
    async fn test_app_state_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path).await.unwrap();
        assert_eq!(state.area_api.count_active().unwrap(), 0);
        assert_eq!(
            state.shift_record_api.calculator().nominal_shift_hours(),
            crate::engine::DEFAULT_NOMINAL_SHIFT_HOURS
        );
    }
}
