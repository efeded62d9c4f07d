use super::*;
use crate::models::WorkbookSnapshot;
use crate::pipeline::analyze_snapshot;
use tempfile::tempdir;

fn report(name: &str) -> AnalysisReport {
    let mut snap = WorkbookSnapshot::new(format!("/books/{name}"));
    snap.sheet_names = vec!["Sheet1".into()];
    analyze_snapshot(snap)
}

fn open_temp() -> (tempfile::TempDir, AnalysisStore) {
    let dir = tempdir().unwrap();
    let store = AnalysisStore::open(&dir.path().join("nested").join("test.redb")).unwrap();
    (dir, store)
}

#[test]
fn test_empty_store() {
    let (_dir, store) = open_temp();
    assert!(store.list().unwrap().is_empty());
    assert!(store.get(1).unwrap().is_none());
    assert!(!store.delete(1).unwrap());
    assert!(store.search_similar(&[1.0, 0.0], 5).unwrap().is_empty());
}

#[test]
fn test_ids_increase_and_list_newest_first() {
    let (_dir, store) = open_temp();
    let a = store.insert(report("a.xlsx")).unwrap();
    let b = store.insert(report("b.xlsm")).unwrap();
    let c = store.insert(report("c.xls")).unwrap();
    assert_eq!((a.id, b.id, c.id), (1, 2, 3));

    let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.file_name).collect();
    assert_eq!(names, vec!["c.xls", "b.xlsm", "a.xlsx"]);
}

#[test]
fn test_get_roundtrips_report() {
    let (_dir, store) = open_temp();
    let mut r = report("pricing.xlsm");
    r.summary = Some("Pricing sheet".into());
    let stored = store.insert(r.clone()).unwrap();

    let loaded = store.get(stored.id).unwrap().unwrap();
    assert_eq!(loaded.report, r);
    assert_eq!(loaded.summary(), Some("Pricing sheet"));
}

#[test]
fn test_ids_not_reused_after_delete() {
    let (_dir, store) = open_temp();
    store.insert(report("a.xlsx")).unwrap();
    store.insert(report("b.xlsx")).unwrap();
    assert!(store.delete(2).unwrap());
    assert!(store.get(2).unwrap().is_none());
    let next = store.insert(report("c.xlsx")).unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn test_update_attaches_summary() {
    let (_dir, store) = open_temp();
    let mut stored = store.insert(report("a.xlsx")).unwrap();
    stored.report.summary = Some("later".into());
    assert!(store.update(&stored).unwrap());
    assert_eq!(store.get(stored.id).unwrap().unwrap().summary(), Some("later"));
}

#[test]
fn test_search_similar_ranks_by_cosine() {
    let (_dir, store) = open_temp();
    let a = store.insert(report("a.xlsx")).unwrap();
    let b = store.insert(report("b.xlsx")).unwrap();
    let c = store.insert(report("c.xlsx")).unwrap();
    store.put_embedding(a.id, &[1.0, 0.0]).unwrap();
    store.put_embedding(b.id, &[0.7, 0.7]).unwrap();
    store.put_embedding(c.id, &[0.0, 1.0]).unwrap();

    let results = store.search_similar(&[1.0, 0.1], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.file_name, "a.xlsx");
    assert_eq!(results[1].0.file_name, "b.xlsx");
    assert!(results[0].1 >= results[1].1);
}

#[test]
fn test_delete_removes_embedding() {
    let (_dir, store) = open_temp();
    let a = store.insert(report("a.xlsx")).unwrap();
    store.put_embedding(a.id, &[1.0]).unwrap();
    store.delete(a.id).unwrap();
    assert!(store.search_similar(&[1.0], 5).unwrap().is_empty());
}

#[test]
fn test_reopen_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("persist.redb");
    {
        let store = AnalysisStore::open(&path).unwrap();
        store.insert(report("kept.xlsx")).unwrap();
    }
    let store = AnalysisStore::open(&path).unwrap();
    assert_eq!(store.list().unwrap()[0].file_name, "kept.xlsx");
}
