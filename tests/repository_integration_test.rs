// ==========================================
// Repository 集成测试
// ==========================================
// 测试目标: 字段组平铺列读写、唯一约束、外键约束
// ==========================================


use std::sync::{Arc, Mutex};

use chrono::Utc;
use shift_oee::db::open_sqlite_connection;
use shift_oee::domain::{Area, AreaKind, ShiftCode, ShiftMetrics, ShiftRecord};
use shift_oee::repository::{AreaRepository, RepositoryError, ShiftRecordRepository};
use test_helpers::{create_test_db, d, t};

fn setup() -> (tempfile::NamedTempFile, AreaRepository, ShiftRecordRepository) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    (
        temp_file,
        AreaRepository::from_connection(conn.clone()),
        ShiftRecordRepository::from_connection(conn),
    )
}

fn area(area_id: &str, code: &str, kind: AreaKind) -> Area {
    Area {
        area_id: area_id.to_string(),
        code: code.to_string(),
        name: format!("{} 名称", code),
        kind,
        theoretical_capacity: 500.0,
        real_capacity: 400.0,
        active: true,
        created_at: Utc::now(),
    }
}

fn record(record_id: &str, area_id: &str, metrics: ShiftMetrics) -> ShiftRecord {
    let now = Utc::now();
    ShiftRecord {
        record_id: record_id.to_string(),
        area_id: area_id.to_string(),
        shift_date: d(2026, 3, 2),
        shift: ShiftCode::C,
        start_time: Some(t(22, 0)),
        end_time: Some(t(6, 0)),
        planned_output: Some(4000.0),
        actual_output: None,
        notes: None,
        created_by: None,
        metrics,
        availability: 100.0,
        performance: 70.0,
        quality: 100.0,
        oee: 70.0,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_press_metrics_roundtrip() {
    let (_tmp, area_repo, record_repo) = setup();
    area_repo.insert(&area("P1", "PRENSA_1", AreaKind::Press)).unwrap();

    let rec = record(
        "R1",
        "P1",
        ShiftMetrics::Press {
            initial_reading: Some(100.0),
            final_reading: None,
            stop_count: 3,
            stop_reason: Some("缺料".to_string()),
        },
    );
    record_repo.insert(&rec).unwrap();

    let loaded = record_repo.find_by_id("R1").unwrap().expect("记录应存在");
    assert_eq!(loaded, rec);

    let by_key = record_repo
        .find_by_key("P1", d(2026, 3, 2), ShiftCode::C)
        .unwrap()
        .expect("按唯一键应可查到");
    assert_eq!(by_key.record_id, "R1");
    assert!(record_repo
        .find_by_key("P1", d(2026, 3, 2), ShiftCode::A)
        .unwrap()
        .is_none());
}

#[test]
fn test_unique_key_violation() {
    let (_tmp, area_repo, record_repo) = setup();
    area_repo.insert(&area("E1", "EMPAQUE_COBRA", AreaKind::Packaging)).unwrap();

    let metrics = ShiftMetrics::empty_for(AreaKind::Packaging);
    record_repo.insert(&record("R1", "E1", metrics.clone())).unwrap();

    let err = record_repo.insert(&record("R2", "E1", metrics)).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    assert_eq!(record_repo.count_by_date(d(2026, 3, 2)).unwrap(), 1);
}

#[test]
fn test_unknown_area_foreign_key() {
    let (_tmp, _area_repo, record_repo) = setup();

    let err = record_repo
        .insert(&record("R1", "missing", ShiftMetrics::empty_for(AreaKind::Packaging)))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
}

#[test]
fn test_area_code_and_name_unique() {
    let (_tmp, area_repo, _record_repo) = setup();
    area_repo.insert(&area("E1", "EMPAQUE_COBRA", AreaKind::Packaging)).unwrap();

    let err = area_repo
        .insert(&area("E2", "EMPAQUE_COBRA", AreaKind::Packaging))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

    assert_eq!(
        area_repo.list(true, Some(AreaKind::Packaging)).unwrap().len(),
        1
    );
    assert!(area_repo.list(true, Some(AreaKind::Press)).unwrap().is_empty());
}
