// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试范围:
// 1. 看板汇总: 平均值 / 当日记录数 / 启用区域数 / 等级
// 2. 单区域统计与按区域统计
// ==========================================


use shift_oee::api::{ApiError, SubmissionMode};
use shift_oee::domain::{OeeStatus, RecordFilter, ShiftCode};
use test_helpers::{d, packaging_input, press_input, TestEnv};

#[test]
fn test_summary_空库() {
    let env = TestEnv::new().expect("无法创建测试环境");

    let summary = env
        .dashboard_api
        .summary(&RecordFilter::default(), d(2026, 3, 2))
        .expect("查询失败");

    assert_eq!(summary.averages.total_records, 0);
    assert_eq!(summary.averages.oee_avg, 0.0);
    assert_eq!(summary.averages.quality_avg, 0.0);
    assert_eq!(summary.records_today, 0);
    assert_eq!(summary.active_areas, 0);
    assert_eq!(summary.status, OeeStatus::Critical);
}

#[test]
fn test_summary_平均值与当日记录数() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);
    let press = env.press_area("PRENSA_1", 500.0);
    let inactive = env.packaging_area("EMPAQUE_VIEJA", 1000.0);
    env.area_api.set_area_active(&inactive, false).unwrap();

    // 包装 OEE 85 (2026-03-01), 压机 OEE 54 (2026-03-02)
    env.record_api
        .create(packaging_input(&pack, d(2026, 3, 1), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();
    env.record_api
        .create(press_input(&press, d(2026, 3, 2), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();

    let summary = env
        .dashboard_api
        .summary(&RecordFilter::default(), d(2026, 3, 2))
        .expect("查询失败");

    assert_eq!(summary.averages.total_records, 2);
    assert_eq!(summary.averages.oee_avg, 69.5);
    assert_eq!(summary.averages.availability_avg, 87.5);
    assert_eq!(summary.averages.performance_avg, 82.5);
    assert_eq!(summary.averages.quality_avg, 95.0);
    assert_eq!(summary.records_today, 1);
    assert_eq!(summary.active_areas, 2);
    assert_eq!(summary.status, OeeStatus::Warning);

    // filter 只影响平均值, 不影响当日记录数
    let only_day1 = env
        .dashboard_api
        .summary(&RecordFilter::for_date(d(2026, 3, 1)), d(2026, 3, 2))
        .unwrap();
    assert_eq!(only_day1.averages.total_records, 1);
    assert_eq!(only_day1.averages.oee_avg, 85.0);
    assert_eq!(only_day1.status, OeeStatus::Excellent);
    assert_eq!(only_day1.records_today, 1);
}

#[test]
fn test_area_stats_单区域() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);
    let press = env.press_area("PRENSA_1", 500.0);

    env.record_api
        .create(packaging_input(&pack, d(2026, 3, 2), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();
    env.record_api
        .create(press_input(&press, d(2026, 3, 2), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();

    // filter 中的 area_id 被覆盖
    let stats = env
        .dashboard_api
        .area_stats(&press, &RecordFilter::for_area(&pack))
        .expect("查询失败");
    assert_eq!(stats.code, "PRENSA_1");
    assert_eq!(stats.averages.total_records, 1);
    assert_eq!(stats.averages.oee_avg, 54.0);
    assert_eq!(stats.status, OeeStatus::Critical);

    assert!(matches!(
        env.dashboard_api.area_stats("missing", &RecordFilter::default()),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_stats_by_area_含无记录区域() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);
    env.press_area("PRENSA_1", 500.0);

    env.record_api
        .create(packaging_input(&pack, d(2026, 3, 2), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();

    let stats = env
        .dashboard_api
        .stats_by_area(&RecordFilter::default())
        .expect("查询失败");
    assert_eq!(stats.len(), 2);

    let press_stats = stats.iter().find(|s| s.code == "PRENSA_1").unwrap();
    assert_eq!(press_stats.averages.total_records, 0);
    assert_eq!(press_stats.averages.oee_avg, 0.0);

    let pack_stats = stats.iter().find(|s| s.code == "EMPAQUE_COBRA").unwrap();
    assert_eq!(pack_stats.averages.oee_avg, 85.0);
    assert_eq!(pack_stats.status, OeeStatus::Excellent);
}
