// ==========================================
// 班次 OEE 管理系统 - OEE 配置读取 Trait
// ==========================================
// 职责: 定义 OEE 计算与看板所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::ConfigResult;
use crate::domain::types::OeeThresholds;
use async_trait::async_trait;

// ==========================================
// OeeConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait OeeConfigReader: Send + Sync {
    /// 获取名义班长（小时）
    ///
    /// # 默认值
    /// - 8.0
    ///
    /// # 用途
    /// - 时间开动率的分母
    async fn get_nominal_shift_hours(&self) -> ConfigResult<f64>;

    /// 获取 OEE 等级阈值
    ///
    /// # 默认值
    /// - 优秀 85 / 良好 75 / 关注 65
    async fn get_oee_thresholds(&self) -> ConfigResult<OeeThresholds>;
}
