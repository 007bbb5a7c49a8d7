mod api_interfaces;
pub mod api;
pub mod client;
pub mod constants;
pub mod error;
pub mod notify;
pub mod record;
pub mod util;

pub use api::{AddressApi, EndpointConfig};
pub use client::AddressBookClient;
pub use error::{ConfigError, RequestError};
pub use notify::{Notifier, StdoutNotifier};
pub use record::{
    AddressChanges, AddressChangesBuilder, AddressChangesBuilderError, AddressField, AddressId,
    AddressRecord, AddressRecordBuilder, AddressRecordBuilderError,
};
