use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use tasklist_core::{
    decode_tasks, DueDatePolicy, MemoryAdapter, PersistResult, PersistenceAdapter, Progress,
    StoreConfig, StoreError, StoreEvent, TaskId, TaskStore,
};

fn store() -> TaskStore {
    TaskStore::new(StoreConfig {
        due_date_policy: DueDatePolicy::NoDate,
        ..StoreConfig::default()
    })
}

fn seeded(titles: &[&str]) -> TaskStore {
    let store = store();
    for title in titles {
        store.add_task(title, None).unwrap();
    }
    store
}

#[test]
fn add_task_appends_one_pending_task() {
    let store = seeded(&["a", "b"]);
    let before = store.list_all().len();

    let task = store
        .add_task("Pay rent", NaiveDate::from_ymd_opt(2026, 11, 1))
        .unwrap();

    let all = store.list_all();
    assert_eq!(all.len(), before + 1);
    assert!(!task.is_completed);
    assert_eq!(all.last(), Some(&task));
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 11, 1));
}

#[test]
fn add_task_rejects_empty_and_whitespace_titles() {
    let store = seeded(&["keep"]);
    let before = store.list_all();

    for title in ["", "   "] {
        let err = store.add_task(title, None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)), "{err}");
    }
    assert_eq!(store.list_all(), before);
}

#[test]
fn toggle_flips_only_target_and_twice_restores() {
    let store = seeded(&["a", "b", "c"]);
    let original = store.list_all();
    let target = original[1].id;

    let toggled = store.toggle_completion(target).unwrap();
    assert!(toggled.is_completed);

    let after = store.list_all();
    for (before, now) in original.iter().zip(after.iter()) {
        if before.id == target {
            assert_eq!(now.is_completed, !before.is_completed);
        } else {
            assert_eq!(now, before);
        }
    }

    store.toggle_completion(target).unwrap();
    assert_eq!(store.list_all(), original);
}

#[test]
fn toggle_unknown_id_is_not_found() {
    let store = seeded(&["a"]);
    let before = store.list_all();
    let missing = TaskId::new();

    assert_eq!(
        store.toggle_completion(missing).unwrap_err(),
        StoreError::NotFound(missing)
    );
    assert_eq!(store.list_all(), before);
}

#[test]
fn delete_unknown_id_is_hard_error() {
    let store = seeded(&["a"]);
    let task = store.list_all()[0].clone();

    store.delete_task(task.id).unwrap();
    assert_eq!(
        store.delete_task(task.id).unwrap_err(),
        StoreError::NotFound(task.id)
    );
    assert_eq!(store.revision(), 2);
}

#[test]
fn delete_preserves_order_of_remaining_tasks() {
    let store = seeded(&["a", "b", "c", "d"]);
    let ids: Vec<_> = store.list_all().iter().map(|task| task.id).collect();

    store.delete_task(ids[1]).unwrap();

    let titles: Vec<_> = store.list_all().into_iter().map(|task| task.title).collect();
    assert_eq!(titles, vec!["a", "c", "d"]);
}

#[test]
fn completion_filters_partition_the_list() {
    let store = seeded(&["a", "b", "c", "d", "e"]);
    let all = store.list_all();
    store.toggle_completion(all[0].id).unwrap();
    store.toggle_completion(all[3].id).unwrap();

    let done = store.list_by_completion(true);
    let pending = store.list_by_completion(false);
    let all = store.list_all();

    assert_eq!(done.len() + pending.len(), all.len());
    for task in &all {
        let in_done = done.iter().any(|t| t.id == task.id);
        let in_pending = pending.iter().any(|t| t.id == task.id);
        assert!(in_done ^ in_pending);
    }
    let done_titles: Vec<_> = done.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(done_titles, vec!["a", "d"]);
}

#[test]
fn filters_on_empty_store_return_empty() {
    let store = store();
    assert!(store.list_by_completion(true).is_empty());
    assert!(store.list_by_completion(false).is_empty());
}

#[test]
fn empty_store_progress_is_zero() {
    let progress = store().progress();
    assert_eq!(progress.completed_count, 0);
    assert_eq!(progress.total_count, 0);
    assert_eq!(progress.ratio, 0.0);
}

#[test]
fn buy_milk_scenario() {
    let store = store();
    let milk = store.add_task("Buy milk", None).unwrap();
    store.add_task("Write report", None).unwrap();
    store.toggle_completion(milk.id).unwrap();

    let summary: Vec<_> = store
        .list_all()
        .into_iter()
        .map(|task| (task.title, task.is_completed))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Buy milk".to_string(), true),
            ("Write report".to_string(), false),
        ]
    );
    assert_eq!(store.progress(), Progress::from_counts(1, 2));
    assert_eq!(store.progress().ratio, 0.5);
}

#[test]
fn saved_bytes_restore_an_equal_store() {
    let adapter = Arc::new(MemoryAdapter::new());
    let original = TaskStore::open(StoreConfig::default(), adapter.clone());
    let first = original.add_task("Buy milk", None).unwrap();
    original
        .add_task("Write report", NaiveDate::from_ymd_opt(2026, 12, 24))
        .unwrap();
    original.toggle_completion(first.id).unwrap();

    let bytes = adapter.load().unwrap().unwrap();
    let restored = TaskStore::open(
        StoreConfig::default(),
        Arc::new(MemoryAdapter::with_bytes(bytes)),
    );

    assert_eq!(restored.list_all(), original.list_all());
}

#[test]
fn deleting_last_task_returns_to_empty_progress() {
    let store = seeded(&["only"]);
    let id = store.list_all()[0].id;

    store.delete_task(id).unwrap();

    assert!(store.list_all().is_empty());
    assert_eq!(store.progress(), Progress::empty());
}

#[test]
fn observers_receive_one_event_per_successful_mutation() {
    let store = store();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = store.subscribe(Arc::new(move |event: &StoreEvent| {
        sink.lock().unwrap().push(*event);
    }));

    let task = store.add_task("a", None).unwrap();
    let _ = store.add_task(" ", None);
    store.toggle_completion(task.id).unwrap();
    let _ = store.toggle_completion(TaskId::new());
    store.delete_task(task.id).unwrap();

    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            StoreEvent::TaskAdded {
                id: task.id,
                revision: 1
            },
            StoreEvent::TaskToggled {
                id: task.id,
                is_completed: true,
                revision: 2
            },
            StoreEvent::TaskDeleted {
                id: task.id,
                revision: 3
            },
        ]
    );
    assert!(store.unsubscribe(subscription));
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn observers_can_read_the_store_during_notification() {
    let store = Arc::new(store());
    let seen_len = Arc::new(AtomicUsize::new(0));

    let reader = Arc::downgrade(&store);
    let seen = Arc::clone(&seen_len);
    store.subscribe(Arc::new(move |_: &StoreEvent| {
        if let Some(store) = reader.upgrade() {
            seen.store(store.list_all().len(), Ordering::SeqCst);
        }
    }));

    store.add_task("visible", None).unwrap();
    assert_eq!(seen_len.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_writers_never_lose_tasks() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = Arc::new(TaskStore::open(
        StoreConfig {
            due_date_policy: DueDatePolicy::NoDate,
            ..StoreConfig::default()
        },
        adapter.clone(),
    ));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..25 {
                    let task = store.add_task(&format!("w{worker}-{n}"), None).unwrap();
                    if n % 2 == 0 {
                        store.toggle_completion(task.id).unwrap();
                    }
                    let progress = store.progress();
                    assert!(progress.completed_count <= progress.total_count);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 100);
    assert_eq!(store.progress().completed_count, 52);
    assert_eq!(store.revision(), 152);

    let restored = TaskStore::open(StoreConfig::default(), adapter);
    assert_eq!(restored.list_all(), store.list_all());
}

#[test]
fn persist_now_waits_for_in_flight_save_instead_of_repeating_it() {
    let adapter = Arc::new(PausingAdapter::new());
    let store = Arc::new(TaskStore::open(no_date_config(), adapter.clone()));
    store.add_task("a", None).unwrap();

    adapter.pause_next.store(true, Ordering::SeqCst);
    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.add_task("b", None).unwrap())
    };
    adapter.entered.wait();
    // Revision 2 is committed and its save holds the persist gate.
    assert_eq!(store.revision(), 2);

    let saver = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.persist_now())
    };
    adapter.release.wait();
    writer.join().unwrap();
    saver.join().unwrap().unwrap();

    assert_eq!(adapter.inner.save_count(), 2);
    let stored = decode_tasks(&adapter.inner.bytes().unwrap()).unwrap();
    assert_eq!(stored, store.list_all());
}

#[test]
fn storage_matches_memory_after_concurrent_explicit_saves() {
    let adapter = Arc::new(MemoryAdapter::new());
    let store = Arc::new(TaskStore::open(no_date_config(), adapter.clone()));

    let mut handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..25 {
                    store.add_task(&format!("w{worker}-{n}"), None).unwrap();
                }
            })
        })
        .collect();
    handles.push({
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..50 {
                store.persist_now().unwrap();
            }
        })
    });
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = decode_tasks(&adapter.bytes().unwrap()).unwrap();
    assert_eq!(stored.len(), 100);
    assert_eq!(stored, store.list_all());
}

fn no_date_config() -> StoreConfig {
    StoreConfig {
        due_date_policy: DueDatePolicy::NoDate,
        ..StoreConfig::default()
    }
}

/// Memory adapter whose next save blocks between two barriers.
struct PausingAdapter {
    inner: MemoryAdapter,
    pause_next: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl PausingAdapter {
    fn new() -> Self {
        Self {
            inner: MemoryAdapter::new(),
            pause_next: AtomicBool::new(false),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl PersistenceAdapter for PausingAdapter {
    fn save(&self, bytes: &[u8]) -> PersistResult<()> {
        if self.pause_next.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        self.inner.save(bytes)
    }

    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        self.inner.load()
    }
}
