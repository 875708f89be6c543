//! Reactive notification layer between `shakwa-api` and UI consumers.
//!
//! - **[`NotificationCenter`]**: Owning consumer. [`mount()`](NotificationCenter::mount)
//!   creates a store, kicks off the first history fetch, and spawns the push
//!   connection whose handler feeds the store. [`unmount()`](NotificationCenter::unmount)
//!   tears the connection down for good. [`NotificationCenter::oneshot()`]
//!   runs a single REST interaction for CLI commands.
//!
//! - **[`NotificationStore`]**: Ordered notification list plus the unread
//!   aggregate, published through a `watch` channel. Push deliveries are
//!   prepended, user mutations are applied optimistically and never rolled back.
//!
//! - **[`NotificationStream`]**: Subscription handle vended by the store with
//!   `current()` / `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **Locale** ([`Locale`], [`LocaleHandle`]) and **toasts** ([`ToastSink`]):
//!   the active language is handed in explicitly as a `watch` receiver;
//!   toast rendering is a seam the consumer implements.

pub mod center;
pub mod config;
pub mod convert;
pub mod error;
pub mod locale;
pub mod model;
pub mod store;
pub mod stream;
pub mod toast;

pub use center::NotificationCenter;
pub use config::{NotifierConfig, TlsVerification};
pub use error::CoreError;
pub use locale::{Locale, LocaleHandle, TextDirection};
pub use model::{Notification, NotificationId, relative_age};
pub use store::{NotificationSnapshot, NotificationStore};
pub use stream::NotificationStream;
pub use toast::{Toast, ToastSink, TracingToastSink};

pub use shakwa_api::{ConnectionState, NotificationClient, Session};
