//! 저장소 테스트
//!
//! 등록/수정/가져오기/보관/삭제 후 파일에 다시 읽었을 때의 상태를 검증

use chrono::{NaiveDate, NaiveDateTime};
use npk_sop::error::ReportError;
use npk_sop::store::{ReportQuery, ReportStore, Tab};
use npk_sop_common::{Department, ReportDraft, ReportForm};
use tempfile::tempdir;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 10)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn form(no: &str) -> ReportForm {
    ReportForm {
        notification_no: no.to_string(),
        equipment_name: "메인 펌프".to_string(),
        work_dept: Department::Rotating,
        fail_date: "2024-05-10".to_string(),
        fail_time: "14:30".to_string(),
        cause: "베어링 마모".to_string(),
        ..Default::default()
    }
}

fn draft(no: &str) -> ReportDraft {
    ReportDraft {
        notification_no: no.to_string(),
        equipment_name: "냉각탑".to_string(),
        created_at: "2024. 5. 10.".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_submit_prepends() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    assert!(store.is_empty());

    let first = store.submit(form("1"), None, at(9, 0)).unwrap();
    let second = store.submit(form("2"), Some("권고".into()), at(9, 5)).unwrap();

    let numbers: Vec<&str> = store.reports().iter().map(|r| r.notification_no.as_str()).collect();
    assert_eq!(numbers, vec!["2", "1"]);
    assert!(first.id.starts_with("REP-"));
    assert_ne!(first.id, second.id);
    assert_eq!(first.created_at, "2024. 5. 10.");
    assert!(!first.is_archived);
    assert_eq!(second.ai_insights.as_deref(), Some("권고"));
}

#[test]
fn test_same_instant_ids_stay_unique() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));

    let a = store.submit(form("a"), None, at(9, 0)).unwrap();
    let b = store.submit(form("b"), None, at(9, 0)).unwrap();
    assert_ne!(a.id, b.id);
    assert!(b.id.starts_with(&a.id));
}

#[test]
fn test_submit_and_import_at_same_instant_stay_unique() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));

    store.submit(form("a"), None, at(9, 0)).unwrap();
    store.submit(form("b"), None, at(9, 0)).unwrap();
    store.insert_imported(vec![draft("A"), draft("B"), draft("C")], at(9, 0)).unwrap();
    store.insert_imported(vec![draft("D")], at(9, 0)).unwrap();

    let mut ids: Vec<&str> = store.reports().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 6);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6, "중복 id: {:?}", store.reports().iter().map(|r| &r.id).collect::<Vec<_>>());

    // 각 id 로 정확히 해당 레코드를 찾는다
    for report in store.reports() {
        assert_eq!(store.get(&report.id).unwrap().notification_no, report.notification_no);
    }
}

#[test]
fn test_failed_write_leaves_store_untouched() {
    let dir = tempdir().expect("Failed to create temp dir");
    // 저장 경로가 디렉터리라서 교체가 실패한다
    let path = dir.path().join("reports.json");
    std::fs::create_dir(&path).unwrap();

    let mut store = ReportStore::open(&path);
    assert!(store.submit(form("a"), None, at(9, 0)).is_err());
    assert!(store.is_empty());
    assert!(store.insert_imported(vec![draft("A")], at(9, 0)).is_err());
    assert!(store.is_empty());

    // 임시 파일이 남지 않는다
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().flatten().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn test_no_temp_files_left_after_writes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("reports.json");
    let mut store = ReportStore::open(&path);
    let a = store.submit(form("a"), None, at(9, 0)).unwrap();
    store.toggle_archived(&a.id).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().flatten().collect();
    assert_eq!(entries.len(), 1, "임시 파일이 남아 있음");
    assert!(ReportStore::open(&path).get(&a.id).unwrap().is_archived);
}

#[test]
fn test_replace_keeps_identity() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    let original = store.submit(form("1"), Some("기존 자문".into()), at(9, 0)).unwrap();
    store.toggle_archived(&original.id).unwrap();

    let mut edited = ReportForm::from(&original);
    edited.action = "베어링 교체".to_string();
    edited.is_completed = true;
    let replaced = store.replace(&original.id, edited, None).unwrap();

    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.created_at, original.created_at);
    assert!(replaced.is_archived);
    assert!(replaced.is_completed);
    assert_eq!(replaced.action, "베어링 교체");
    assert_eq!(replaced.ai_insights, None);
    assert_eq!(store.len(), 1);

    let missing = store.replace("REP-missing", form("x"), None);
    assert!(matches!(missing, Err(ReportError::ReportNotFound(_))));
}

#[test]
fn test_imported_rows_keep_file_order_at_front() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    store.submit(form("old"), None, at(8, 0)).unwrap();

    let count = store
        .insert_imported(vec![draft("A"), draft("B"), draft("C")], at(9, 0))
        .unwrap();
    assert_eq!(count, 3);

    let numbers: Vec<&str> = store.reports().iter().map(|r| r.notification_no.as_str()).collect();
    assert_eq!(numbers, vec!["A", "B", "C", "old"]);

    let stamp = at(9, 0).and_utc().timestamp_millis();
    assert_eq!(store.reports()[0].id, format!("REP-{}-0", stamp));
    assert_eq!(store.reports()[2].id, format!("REP-{}-2", stamp));
    assert!(store.reports()[0].ai_insights.is_none());
}

#[test]
fn test_toggles_and_bulk_archive() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    let a = store.submit(form("a"), None, at(9, 0)).unwrap();
    let b = store.submit(form("b"), None, at(9, 1)).unwrap();
    let c = store.submit(form("c"), None, at(9, 2)).unwrap();

    assert!(store.toggle_completed(&a.id).unwrap());
    assert!(!store.toggle_completed(&a.id).unwrap());

    let archived = store.set_archived(&[a.id.clone(), c.id.clone(), "REP-none".into()], true).unwrap();
    assert_eq!(archived, 2);

    let reports_tab = ReportQuery { tab: Tab::Reports, ..Default::default() };
    let archive_tab = ReportQuery { tab: Tab::Archive, ..Default::default() };
    assert_eq!(reports_tab.apply(store.reports()).len(), 1);
    assert_eq!(archive_tab.apply(store.reports()).len(), 2);

    store.set_archived(&[c.id.clone()], false).unwrap();
    assert!(!store.get(&c.id).unwrap().is_archived);
    assert!(!store.get(&b.id).unwrap().is_archived);
}

#[test]
fn test_remove() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    let a = store.submit(form("a"), None, at(9, 0)).unwrap();
    store.submit(form("b"), None, at(9, 1)).unwrap();

    let removed = store.remove(&a.id).unwrap();
    assert_eq!(removed.notification_no, "a");
    assert_eq!(store.len(), 1);
    assert!(store.get(&a.id).is_none());
}

#[test]
fn test_changes_survive_reopen() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("reports.json");

    let id = {
        let mut store = ReportStore::open(&path);
        let report = store.submit(form("persist"), Some("자문".into()), at(9, 0)).unwrap();
        store.toggle_completed(&report.id).unwrap();
        store.insert_imported(vec![draft("imported")], at(10, 0)).unwrap();
        report.id
    };

    let reopened = ReportStore::open(&path);
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.reports()[0].notification_no, "imported");
    let report = reopened.get(&id).unwrap();
    assert!(report.is_completed);
    assert_eq!(report.ai_insights.as_deref(), Some("자문"));

    let stats = reopened.stats();
    assert_eq!(stats.total_reports, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.ai_analyzed, 1);
}

#[test]
fn test_corrupt_file_opens_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("reports.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = ReportStore::open(&path);
    assert!(store.is_empty());
}

#[test]
fn test_select_keeps_store_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ReportStore::open(&dir.path().join("reports.json"));
    let a = store.submit(form("a"), None, at(9, 0)).unwrap();
    let b = store.submit(form("b"), None, at(9, 1)).unwrap();

    let selected = store.select(&[a.id.clone(), "REP-none".into(), b.id.clone()]);
    let numbers: Vec<&str> = selected.iter().map(|r| r.notification_no.as_str()).collect();
    assert_eq!(numbers, vec!["b", "a"]);
}
