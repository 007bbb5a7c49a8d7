//! The address book state container.
//!
//! [`AddressBookClient`] owns the displayed list and the draft bound to the
//! creation form. The list is only ever replaced wholesale by a successful
//! fetch; mutations go to the service and are followed by a refresh. Every
//! operation takes `&self`, so several can be in flight at once. The state
//! lock is never held across an `.await`, which means overlapping operations
//! race and the refresh that resolves last decides what the list shows.

use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::{
    api::AddressApi,
    error::RequestError,
    notify::{Notifier, StdoutNotifier},
    record::{AddressChanges, AddressField, AddressId, AddressRecord},
};

#[derive(Debug, Default)]
struct State {
    addresses: Vec<AddressRecord>,
    draft: AddressRecord,
}

#[derive(Debug)]
pub struct AddressBookClient<N = StdoutNotifier> {
    api: AddressApi,
    notifier: N,
    state: Mutex<State>,
}

impl AddressBookClient<StdoutNotifier> {
    pub fn with_stdout(api: AddressApi) -> Self {
        Self::new(api, StdoutNotifier)
    }
}

impl<N: Notifier> AddressBookClient<N> {
    /// Starts with an empty list and an empty draft.
    pub fn new(api: AddressApi, notifier: N) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(State::default()),
        }
    }

    /// Snapshot of the list as of the last successful fetch.
    pub fn addresses(&self) -> Vec<AddressRecord> {
        self.state().addresses.clone()
    }

    pub fn draft(&self) -> AddressRecord {
        self.state().draft.clone()
    }

    pub fn set_draft_field(&self, field: AddressField, value: impl Into<String>) {
        self.state().draft.set_field(field, value);
    }

    pub fn clear_draft(&self) {
        self.state().draft = AddressRecord::default();
    }

    /// Entries whose `field` equals `text`, ignoring case. Reads the list as
    /// of the last fetch; nothing is sent.
    pub fn search(&self, field: AddressField, text: &str) -> Vec<AddressRecord> {
        let needle = text.to_lowercase();
        self.state()
            .addresses
            .iter()
            .filter(|address| address.field(field).to_lowercase() == needle)
            .cloned()
            .collect()
    }

    /// Entries whose `YYYY-MM-DD` birthday falls on the month and day of `date`.
    pub fn birthdays_on(&self, date: NaiveDate) -> Vec<AddressRecord> {
        let month_day = date.format("%m-%d").to_string();
        self.state()
            .addresses
            .iter()
            .filter(|address| address.birthday.get(5..) == Some(month_day.as_str()))
            .cloned()
            .collect()
    }

    pub fn todays_birthdays(&self) -> Vec<AddressRecord> {
        self.birthdays_on(Local::now().date_naive())
    }

    /// Replace the list with whatever the service holds now.
    ///
    /// On failure the list keeps its previous value.
    pub async fn fetch_all(&self) -> Result<Vec<AddressRecord>, RequestError> {
        match self.api.list().await {
            Ok(addresses) => {
                info!(count = addresses.len(), "fetched addresses");
                self.state().addresses = addresses.clone();
                Ok(addresses)
            }
            Err(e) => {
                error!(error = %e, "Error fetching addresses");
                Err(e)
            }
        }
    }

    /// Look up a single record. The list is not touched.
    pub async fn get(&self, id: &AddressId) -> Result<AddressRecord, RequestError> {
        self.api.get(id).await.inspect_err(|e| {
            error!(%id, error = %e, "Error fetching address");
        })
    }

    /// Send `draft` to the service, show its reply and refresh.
    ///
    /// The returned message is the service's confirmation. A failed refresh
    /// afterwards is logged by [`Self::fetch_all`] and does not turn the
    /// create into an error.
    pub async fn create(&self, draft: &AddressRecord) -> Result<String, RequestError> {
        let message = self.api.create(draft).await.inspect_err(|e| {
            error!(error = %e, "Error adding address");
        })?;
        self.acknowledge(&message).await;
        Ok(message)
    }

    /// Submit the current draft. The draft is left as it was.
    pub async fn submit_draft(&self) -> Result<String, RequestError> {
        let draft = self.draft();
        self.create(&draft).await
    }

    pub async fn update(
        &self,
        id: &AddressId,
        changes: &AddressChanges,
    ) -> Result<String, RequestError> {
        let message = self.api.update(id, changes).await.inspect_err(|e| {
            error!(%id, error = %e, "Error updating address");
        })?;
        self.acknowledge(&message).await;
        Ok(message)
    }

    pub async fn delete(&self, id: &AddressId) -> Result<String, RequestError> {
        let message = self.api.delete(id).await.inspect_err(|e| {
            error!(%id, error = %e, "Error deleting address");
        })?;
        self.acknowledge(&message).await;
        Ok(message)
    }

    async fn acknowledge(&self, message: &str) {
        self.notifier.notify(message);
        // logged inside fetch_all
        let _ = self.fetch_all().await;
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
