use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use love_timer::prefs::{SELECTED_IMAGE_URI_KEY, START_TIME_KEY};
use love_timer::ticker::{DEFAULT_PERIOD, Ticker};
use love_timer::{
    AppState, Clock, DateEntry, ElapsedBreakdown, FixedClock, ImageReference, JsonFileStore,
    MemoryStore, PreferenceStore, StartDate, compute,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn noon(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0).unwrap()
}

/// A store whose writes always fail, and optionally its reads too.
#[derive(Default)]
struct BrokenStore {
    fail_reads: bool,
}

impl PreferenceStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            Err(anyhow!("storage unavailable reading {key}"))
        } else {
            Ok(Some("2020-1-15-0-0".to_string()))
        }
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("disk full writing {key}"))
    }
}

#[test]
fn selections_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut app = AppState::load(store, today());
        assert!(app.select_start_date(StartDate::new(2020, 1, 15, 0, 0).unwrap()));
        assert!(app.select_image(ImageReference::new("content://photos/1").unwrap()));
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    let app = AppState::load(reopened, today());

    assert_eq!(*app.start_date(), StartDate::new(2020, 1, 15, 0, 0).unwrap());
    assert_eq!(app.image().map(ImageReference::as_str), Some("content://photos/1"));
    assert_eq!(
        app.breakdown_at(NaiveDate::from_ymd_opt(2021, 3, 20).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        ElapsedBreakdown {
            years: 1,
            months: 2,
            days: 5,
            ..ElapsedBreakdown::ZERO
        }
    );
}

#[test]
fn default_start_is_not_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let app = AppState::load(JsonFileStore::open(&path).unwrap(), today());
    assert_eq!(*app.start_date(), StartDate::midnight(today()));
    assert!(!path.exists());
}

#[test]
fn corrupt_prefs_file_falls_back_and_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut app = AppState::load(JsonFileStore::open_or_empty(&path), today());
    assert_eq!(*app.start_date(), StartDate::midnight(today()));
    assert!(app.image().is_none());

    let picked = StartDate::new(2020, 1, 15, 0, 0).unwrap();
    assert!(app.select_start_date(picked));

    let repaired = JsonFileStore::open(&path).unwrap();
    assert_eq!(
        repaired.get(START_TIME_KEY).unwrap().as_deref(),
        Some("2020-1-15-0-0")
    );
}

#[test]
fn legacy_date_only_value_loads_at_midnight() {
    let store = MemoryStore::new().with(START_TIME_KEY, "2019-6-14");
    let app = AppState::load(store, today());
    assert_eq!(*app.start_date(), StartDate::new(2019, 6, 14, 0, 0).unwrap());
}

#[test]
fn write_failures_are_swallowed() {
    let mut app = AppState::load(BrokenStore::default(), today());
    assert_eq!(*app.start_date(), StartDate::new(2020, 1, 15, 0, 0).unwrap());

    let picked = StartDate::new(2022, 2, 2, 22, 22).unwrap();
    assert!(!app.select_start_date(picked));
    assert_eq!(*app.start_date(), picked);

    assert!(!app.select_image(ImageReference::new("file:///us.png").unwrap()));
    assert_eq!(app.image().map(ImageReference::as_str), Some("file:///us.png"));
}

#[test]
fn read_failures_fall_back_to_defaults() {
    let app = AppState::load(BrokenStore { fail_reads: true }, today());
    assert_eq!(*app.start_date(), StartDate::midnight(today()));
    assert!(app.image().is_none());
}

#[test]
fn date_entry_writes_only_the_start_key() {
    let mut app = AppState::load(MemoryStore::new(), today());
    let entry = DateEntry {
        year: "2018".into(),
        month: "7".into(),
        day: "".into(),
        ..DateEntry::default()
    };

    assert!(app.apply_date_entry(&entry, today()).unwrap());
    assert_eq!(
        app.store().get(START_TIME_KEY).unwrap().as_deref(),
        Some("2018-7-19-0-0")
    );
    assert_eq!(app.store().get(SELECTED_IMAGE_URI_KEY).unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn ticker_recomputes_against_a_fresh_now() {
    let clock = FixedClock::new(noon(today()));
    let start = StartDate::midnight(today());
    let seen: Arc<Mutex<Vec<ElapsedBreakdown>>> = Arc::default();

    let ticker = {
        let clock = clock.clone();
        let seen = Arc::clone(&seen);
        Ticker::start(DEFAULT_PERIOD, move || {
            clock.advance(TimeDelta::seconds(1));
            seen.lock().unwrap().push(compute(&start, clock.now()));
        })
    };

    tokio::time::sleep(Duration::from_millis(3500)).await;
    ticker.stop().await;

    let seen = seen.lock().unwrap();
    assert!(seen.len() >= 3, "only {} ticks", seen.len());
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(
        seen[0],
        ElapsedBreakdown {
            hours: 12,
            seconds: 1,
            ..ElapsedBreakdown::ZERO
        }
    );
}
