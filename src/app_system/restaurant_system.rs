use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{Config, SystemError};
use crate::admin::{AccessError, AdminConsole, AdminGate};
use crate::auth::{MemoryAuth, ProfileDirectory, SessionProvider};
use crate::cart::CartStore;
use crate::checkout::Checkout;
use crate::clients::{OrderClient, ReservationClient};
use crate::domain::{Order, Reservation};
use crate::ids;
use crate::mirror_framework::MirrorActor;
use crate::remote::{MemoryTable, RemoteTable};
use crate::route_loader::RouteLoader;
use crate::storage::{KeyValueStore, MemoryStorage};

/// Everything the system talks to outside the process.
#[derive(Clone)]
pub struct Backend {
    pub orders: Arc<dyn RemoteTable<Order>>,
    pub reservations: Arc<dyn RemoteTable<Reservation>>,
    pub sessions: Arc<dyn SessionProvider>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub local_storage: Arc<dyn KeyValueStore>,
    pub session_storage: Arc<dyn KeyValueStore>,
}

impl Backend {
    pub fn in_memory() -> Self {
        MemoryBackend::new().backend()
    }
}

/// In-process backend with concrete handles, so demos and tests can sign in,
/// inject failures and simulate other sessions.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    pub orders: Arc<MemoryTable<Order>>,
    pub reservations: Arc<MemoryTable<Reservation>>,
    pub auth: Arc<MemoryAuth>,
    pub local_storage: Arc<MemoryStorage>,
    pub session_storage: Arc<MemoryStorage>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Backend {
        Backend {
            orders: self.orders.clone(),
            reservations: self.reservations.clone(),
            sessions: self.auth.clone(),
            profiles: self.auth.clone(),
            local_storage: self.local_storage.clone(),
            session_storage: self.session_storage.clone(),
        }
    }
}

/// The application, constructed once at start-up.
///
/// Starts one mirror per table and hands out clients; consumers receive
/// clones instead of reaching for globals.
pub struct RestaurantSystem {
    pub order_client: OrderClient,
    pub reservation_client: ReservationClient,
    pub checkout: Checkout,
    pub admin_gate: AdminGate,
    config: Config,
    local_storage: Arc<dyn KeyValueStore>,
    session_storage: Arc<dyn KeyValueStore>,
    handles: Vec<JoinHandle<()>>,
}

impl RestaurantSystem {
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config, backend: Backend) -> Self {
        info!(?config, "Starting restaurant system");
        let settings = config.mirror_settings();

        let (order_actor, order_mirror) = MirrorActor::new(backend.orders, ids::order_id, settings);
        let order_client = OrderClient::new(order_mirror);
        let order_handle = tokio::spawn(order_actor.run());

        let (reservation_actor, reservation_mirror) =
            MirrorActor::new(backend.reservations, ids::reservation_id, settings);
        let reservation_client = ReservationClient::new(reservation_mirror);
        let reservation_handle = tokio::spawn(reservation_actor.run());

        let checkout = Checkout::new(order_client.clone(), config.tax_rate, config.checkout_delay);
        let admin_gate = AdminGate::new(backend.sessions, backend.profiles);

        Self {
            order_client,
            reservation_client,
            checkout,
            admin_gate,
            config,
            local_storage: backend.local_storage,
            session_storage: backend.session_storage,
            handles: vec![order_handle, reservation_handle],
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shopper's cart, restored from the local snapshot.
    pub fn open_cart(&self) -> CartStore {
        CartStore::restore(self.local_storage.clone())
    }

    pub fn route_loader(&self) -> RouteLoader {
        RouteLoader::new(self.session_storage.clone(), self.config.loader)
    }

    /// Runs the admin gate and, for an admin, opens the back office.
    pub async fn admin_console(&self) -> Result<AdminConsole, AccessError> {
        let access = self.admin_gate.authorize().await?;
        Ok(AdminConsole::new(
            access,
            self.order_client.clone(),
            self.reservation_client.clone(),
        ))
    }

    /// Stops both mirrors, closing their change subscriptions, and waits for
    /// them to finish.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        if let Err(e) = self.order_client.shutdown().await {
            warn!(error = %e, "Order mirror already stopped");
        }
        if let Err(e) = self.reservation_client.shutdown().await {
            warn!(error = %e, "Reservation mirror already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Mirror task failed: {:?}", e);
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
