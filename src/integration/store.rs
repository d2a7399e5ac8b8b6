//! Host store boundary
//!
//! The host owns the canonical integration parameters. The connect flow only
//! reads snapshots and hands over pure updaters.

use tokio::sync::watch;

use super::IntegrationParams;

/// Pure `previous -> next` merge applied by the host.
pub type ParamsUpdater = Box<dyn FnOnce(&IntegrationParams) -> IntegrationParams + Send>;

pub trait IntegrationStore: Send + Sync {
    /// Snapshot of the current parameters.
    fn current(&self) -> IntegrationParams;

    /// Apply `updater` to the canonical copy.
    fn update(&self, updater: ParamsUpdater);
}

/// In-memory host store that publishes every change on a watch channel.
pub struct MemoryStore {
    tx: watch::Sender<IntegrationParams>,
}

impl MemoryStore {
    pub fn new(initial: IntegrationParams) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Change notifications, for `ConnectController::follow`.
    pub fn subscribe(&self) -> watch::Receiver<IntegrationParams> {
        self.tx.subscribe()
    }

    /// Replace the parameters outright (e.g. the user switched integration type).
    pub fn replace(&self, params: IntegrationParams) {
        self.tx.send_replace(params);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(IntegrationParams::default())
    }
}

impl IntegrationStore for MemoryStore {
    fn current(&self) -> IntegrationParams {
        self.tx.borrow().clone()
    }

    fn update(&self, updater: ParamsUpdater) {
        self.tx.send_modify(|params| {
            let next = updater(&*params);
            *params = next;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_applies_updater() {
        let store = MemoryStore::default();
        store.update(Box::new(|prev: &IntegrationParams| {
            prev.with_credentials(json!("tok"), "HubSpot")
        }));

        let current = store.current();
        assert_eq!(current.integration_type(), Some("HubSpot"));
        assert_eq!(current.credentials(), Some(&json!("tok")));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = MemoryStore::default();
        let mut rx = store.subscribe();

        store.replace(serde_json::from_value(json!({"type": "Notion"})).unwrap());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().integration_type(), Some("Notion"));

        store.update(Box::new(|prev: &IntegrationParams| {
            prev.with_credentials(json!("tok"), "HubSpot")
        }));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().integration_type(), Some("HubSpot"));
    }
}
