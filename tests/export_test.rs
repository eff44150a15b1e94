// ==========================================
// ExportApi 集成测试
// ==========================================


use shift_oee::api::SubmissionMode;
use shift_oee::domain::{RecordFilter, ShiftCode};
use test_helpers::{d, packaging_input, press_input, TestEnv};

#[test]
fn test_export_csv_表头与行数() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);
    let press = env.press_area("PRENSA_1", 500.0);

    env.record_api
        .create(packaging_input(&pack, d(2026, 3, 1), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();
    env.record_api
        .create(press_input(&press, d(2026, 3, 2), ShiftCode::B), SubmissionMode::Strict)
        .unwrap();

    let mut buf = Vec::new();
    let rows = env
        .export_api
        .export_csv(&RecordFilter::default(), &mut buf)
        .expect("导出失败");
    assert_eq!(rows, 2);

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("area_code,shift_date,shift,start_time,end_time"));
    assert!(lines[0].contains("initial_reading"));
    assert!(lines[0].contains(",oee,"));

    // 日期倒序: 压机记录在前
    assert!(lines[1].starts_with("PRENSA_1,2026-03-02,B,06:00:00,12:00:00"));
    assert!(lines[1].contains("PRESS"));
    assert!(lines[2].starts_with("EMPAQUE_COBRA,2026-03-01,A"));
    assert!(lines[2].contains("25kg"));
}

#[test]
fn test_export_csv_按日期过滤() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);

    for day in 1..=3 {
        env.record_api
            .create(packaging_input(&pack, d(2026, 3, day), ShiftCode::A), SubmissionMode::Strict)
            .unwrap();
    }

    let mut buf = Vec::new();
    let rows = env
        .export_api
        .export_csv(&RecordFilter::for_date(d(2026, 3, 2)), &mut buf)
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 2);
}

#[test]
fn test_export_csv_空结果仍有表头() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let pack = env.packaging_area("EMPAQUE_COBRA", 1000.0);

    let mut empty = Vec::new();
    let rows = env
        .export_api
        .export_csv(&RecordFilter::default(), &mut empty)
        .expect("空结果导出失败");
    assert_eq!(rows, 0);
    let empty_text = String::from_utf8(empty).unwrap();
    let empty_lines: Vec<&str> = empty_text.lines().collect();
    assert_eq!(empty_lines.len(), 1);
    assert!(empty_lines[0].starts_with("area_code,shift_date,shift,"));
    assert!(empty_lines[0].ends_with(",notes,created_by"));

    // 有数据时表头一致
    env.record_api
        .create(packaging_input(&pack, d(2026, 3, 1), ShiftCode::A), SubmissionMode::Strict)
        .unwrap();
    let mut full = Vec::new();
    env.export_api
        .export_csv(&RecordFilter::default(), &mut full)
        .unwrap();
    let full_text = String::from_utf8(full).unwrap();
    assert_eq!(full_text.lines().next(), Some(empty_lines[0]));
    assert_eq!(full_text.lines().count(), 2);
}
