// ==========================================
// 班次 OEE 管理系统 - OEE 汇总
// ==========================================
// 对调用方选定的记录集求四项指标算术平均
// 结果保留一位小数, 无记录时为 0
// ==========================================

use crate::domain::shift_record::ShiftRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 四项指标的平均值
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OeeAverages {
    pub oee_avg: f64,
    pub availability_avg: f64,
    pub performance_avg: f64,
    pub quality_avg: f64,
    pub total_records: usize,
}

pub struct OeeAggregator;

impl OeeAggregator {
    /// 计算平均值
    pub fn averages<'a, I>(records: I) -> OeeAverages
    where
        I: IntoIterator<Item = &'a ShiftRecord>,
    {
        let mut count = 0usize;
        let (mut oee, mut availability, mut performance, mut quality) = (0.0, 0.0, 0.0, 0.0);

        for record in records {
            count += 1;
            oee += record.oee;
            availability += record.availability;
            performance += record.performance;
            quality += record.quality;
        }

        if count == 0 {
            return OeeAverages::default();
        }

        let n = count as f64;
        OeeAverages {
            oee_avg: round1(oee / n),
            availability_avg: round1(availability / n),
            performance_avg: round1(performance / n),
            quality_avg: round1(quality / n),
            total_records: count,
        }
    }

    /// 按区域分组求平均值（key: area_id）
    pub fn averages_by_area(records: &[ShiftRecord]) -> BTreeMap<String, OeeAverages> {
        let mut groups: BTreeMap<String, Vec<&ShiftRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.area_id.clone()).or_default().push(record);
        }

        groups
            .into_iter()
            .map(|(area_id, group)| (area_id, Self::averages(group)))
            .collect()
    }
}

/// 保留一位小数
///
/// 按 f64 的精确十进制值做银行家舍入 (0.25 -> 0.2, 0.15 -> 0.1).
/// 不能先乘 10 再取整: 乘法本身会把 0.15 变成 1.5.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}
