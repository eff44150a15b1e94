// ==========================================
// 班次 OEE 管理系统 - 生产区域领域模型
// ==========================================
// 区域为静态数据：由管理员创建，计算器只读
// ==========================================

use crate::domain::types::AreaKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Area - 生产区域 (包装线 / 压机)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    // ===== 主键 =====
    pub area_id: String,           // 区域ID (uuid)
    pub code: String,              // 区域代码, 例如 EMPAQUE_COBRA
    pub name: String,              // 区域名称

    // ===== 产能参数 =====
    pub kind: AreaKind,            // 区域类型
    pub theoretical_capacity: f64, // 理论产能 (单位/小时, > 0)
    pub real_capacity: f64,        // 实际平均产能 (仅参考, 不参与计算)

    // ===== 状态 =====
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Area {
    /// 给定运行小时数的理论产量
    pub fn theoretical_output(&self, hours: f64) -> f64 {
        self.theoretical_capacity * hours
    }
}

// ==========================================
// 区域创建/更新请求
// ==========================================

/// 创建区域请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArea {
    pub code: String,
    pub name: String,
    pub kind: AreaKind,
    pub theoretical_capacity: f64,
    pub real_capacity: f64,
}

/// 按类型分组的区域列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreasByKind {
    pub packaging: Vec<Area>,
    pub press: Vec<Area>,
}
