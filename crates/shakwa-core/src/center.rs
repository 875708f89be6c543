// ── NotificationCenter ──
//
// The owning consumer: pairs one NotificationStore with one PushConnection
// for as long as it is mounted. Unmounting tears the connection down so no
// reconnect fires afterwards.

use std::future::Future;
use std::sync::Arc;

use shakwa_api::{
    ConnectionState, NotificationClient, PushConnection, PushTransport, Session,
    TungsteniteTransport,
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::NotifierConfig;
use crate::error::CoreError;
use crate::locale::Locale;
use crate::store::NotificationStore;
use crate::toast::ToastSink;

/// A mounted notification layer.
///
/// On [`mount`](Self::mount) the first page of history is fetched in the
/// background and the push connection starts. The center is not `Clone`;
/// clone the [`store`](Self::store) to share state with other tasks.
pub struct NotificationCenter {
    store: NotificationStore,
    push: PushConnection,
}

impl NotificationCenter {
    /// Mount with the production WebSocket transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(
        config: &NotifierConfig,
        session: Session,
        locale: watch::Receiver<Locale>,
        toasts: Arc<dyn ToastSink>,
    ) -> Result<Self, CoreError> {
        Self::mount_with_transport(config, session, locale, toasts, TungsteniteTransport)
    }

    /// Mount with a caller-supplied push transport.
    pub fn mount_with_transport<T: PushTransport>(
        config: &NotifierConfig,
        session: Session,
        locale: watch::Receiver<Locale>,
        toasts: Arc<dyn ToastSink>,
        transport: T,
    ) -> Result<Self, CoreError> {
        let client = NotificationClient::new(
            &config.origin,
            &config.api_path,
            session.clone(),
            &config.transport(),
        )?;
        let store = NotificationStore::new(client, locale, toasts, config.page_size);

        // Not tracked: an in-flight fetch is allowed to finish after unmount.
        let initial = store.clone();
        tokio::spawn(async move { initial.refresh().await });

        let push = PushConnection::spawn(config.push(), session, transport, store.frame_handler());
        info!(origin = %config.origin, "notification center mounted");

        Ok(Self { store, push })
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn is_connected(&self) -> bool {
        self.push.is_connected()
    }

    /// Subscribe to push connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.push.subscribe_state()
    }

    /// Stop the push connection and cancel any pending reconnect.
    pub async fn unmount(self) {
        self.push.teardown().await;
        info!("notification center unmounted");
    }

    /// Run one REST interaction without mounting a push connection.
    ///
    /// Unlike store operations, errors are returned to the caller.
    pub async fn oneshot<F, Fut, T>(
        config: &NotifierConfig,
        session: Session,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(NotificationClient) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        if !session.is_authenticated() {
            return Err(CoreError::MissingCredential);
        }
        let client = NotificationClient::new(
            &config.origin,
            &config.api_path,
            session,
            &config.transport(),
        )?;
        debug!(api = %client.api_base(), "running oneshot request");
        f(client).await
    }
}
