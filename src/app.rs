//! Application state holder.
//!
//! Owns the current start date and image, and the preference store they are
//! persisted through. The store is injected at construction and lives as long
//! as the holder. All mutation happens through `&mut self`, one user action at
//! a time.

use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};

use crate::date_entry::DateEntry;
use crate::elapsed::{self, ElapsedBreakdown};
use crate::image::ImageReference;
use crate::prefs::{PreferenceStore, SELECTED_IMAGE_URI_KEY, START_TIME_KEY};
use crate::start_date::{self, StartDate, StartDateError};

pub struct AppState<S: PreferenceStore> {
    store: S,
    start_date: StartDate,
    image: Option<ImageReference>,
}

impl<S: PreferenceStore> AppState<S> {
    /// Loads persisted state from `store`.
    ///
    /// A missing or unreadable start date becomes midnight of `today`; that
    /// default is not written back.
    pub fn load(store: S, today: NaiveDate) -> Self {
        let raw_start = read_logged(&store, START_TIME_KEY);
        let start_date = start_date::parse_or_default(raw_start.as_deref(), today);

        let image = read_logged(&store, SELECTED_IMAGE_URI_KEY).and_then(ImageReference::new);

        info!(
            "loaded start_date={start_date} image={}",
            image.as_ref().map(ImageReference::as_str).unwrap_or("none")
        );

        Self {
            store,
            start_date,
            image,
        }
    }

    pub fn start_date(&self) -> &StartDate {
        &self.start_date
    }

    pub fn image(&self) -> Option<&ImageReference> {
        self.image.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Elapsed time from the current start date to `now`.
    pub fn breakdown_at(&self, now: NaiveDateTime) -> ElapsedBreakdown {
        elapsed::compute(&self.start_date, now)
    }

    /// Replaces the start date and persists it.
    ///
    /// Returns `false` when the write failed. The new value is kept in memory
    /// either way.
    pub fn select_start_date(&mut self, date: StartDate) -> bool {
        self.start_date = date;
        info!("start date set to {date}");
        write_logged(&mut self.store, START_TIME_KEY, &start_date::format(&date))
    }

    /// Resolves a submitted entry form and applies it. An invalid entry
    /// leaves the current state untouched.
    pub fn apply_date_entry(
        &mut self,
        entry: &DateEntry,
        today: NaiveDate,
    ) -> Result<bool, StartDateError> {
        let date = entry.resolve(today)?;
        Ok(self.select_start_date(date))
    }

    /// Replaces the selected image and persists it.
    pub fn select_image(&mut self, image: ImageReference) -> bool {
        info!("image set to {image}");
        let persisted = write_logged(&mut self.store, SELECTED_IMAGE_URI_KEY, image.as_str());
        self.image = Some(image);
        persisted
    }
}

fn read_logged<S: PreferenceStore>(store: &S, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|err| {
        warn!("failed to read preference `{key}`: {err:#}");
        None
    })
}

fn write_logged<S: PreferenceStore>(store: &mut S, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to persist preference `{key}`: {err:#}");
            false
        }
    }
}
