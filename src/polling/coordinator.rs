use super::refresh_status::{RefreshError, RefreshStatus};
use crate::config::PollingSettings;
use crate::core::domain::{
    fleet_api::FleetApi,
    model::{GuestKind, PowerAction, Snapshot},
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs refresh cycles against a [`FleetApi`] and publishes the resulting
/// [`Snapshot`]s.
///
/// One coordinator serves one cluster. It is meant to be shared behind an
/// `Arc` by every consumer of that cluster's data; cycles never overlap, and
/// readers only ever see complete snapshots.
pub struct PollingCoordinator<A> {
    api: Arc<A>,
    settings: PollingSettings,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    status: RwLock<RefreshStatus>,
    cycle: Mutex<()>,
    wake: Notify,
}

impl<A: FleetApi> PollingCoordinator<A> {
    /// Creates a coordinator with default polling settings.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_settings(api, PollingSettings::default())
    }

    pub fn with_settings(api: Arc<A>, settings: PollingSettings) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            api,
            settings,
            snapshot_tx,
            status: RwLock::new(RefreshStatus::default()),
            cycle: Mutex::new(()),
            wake: Notify::new(),
        }
    }

    /// The last published snapshot; empty until the first successful cycle.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot_tx.borrow())
    }

    /// A receiver that is notified once per published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }

    /// Runs one full cycle and publishes its snapshot.
    ///
    /// Waits for an in-flight cycle to finish first. On failure the
    /// previous snapshot stays published.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let _cycle = self.cycle.lock().await;
        let started = Instant::now();

        match self.collect().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot_tx.send_replace(Arc::clone(&snapshot));
                self.status
                    .write()
                    .await
                    .record_success(snapshot.taken_at.unwrap_or_else(SystemTime::now));
                info!(
                    nodes = snapshot.nodes.len(),
                    guests = snapshot.guests.len(),
                    storage = snapshot.storage.len(),
                    elapsed = ?started.elapsed(),
                    "Refresh cycle complete"
                );
                Ok(snapshot)
            }
            Err(e) => {
                let mut status = self.status.write().await;
                status.record_failure(&e);
                error!(
                    error = %e,
                    consecutive_failures = status.consecutive_failures,
                    "Refresh cycle failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn collect(&self) -> Result<Snapshot, RefreshError> {
        let nodes = self.api.list_nodes().await.map_err(RefreshError::NodeList)?;
        let mut snapshot = Snapshot::empty();

        for node in nodes {
            if self.settings.exclude_nodes.contains(&node.node) {
                debug!(node = %node.node, "Skipping excluded node");
                continue;
            }
            let name = node.node.clone();

            for kind in GuestKind::ALL {
                for mut guest in self.api.list_guests(&name, kind).await {
                    if self.settings.exclude_guests.contains(&guest.vmid) {
                        continue;
                    }
                    guest.node = name.clone();
                    guest.kind = kind;
                    if let Some(previous) = snapshot.guests.insert(guest.vmid, guest) {
                        warn!(
                            vmid = previous.vmid,
                            replaced_node = %previous.node,
                            node = %name,
                            "Guest id reported by more than one node, keeping the later one"
                        );
                    }
                }
            }

            for mut volume in self.api.list_storage(&name).await {
                volume.node = name.clone();
                snapshot.storage.insert(volume.key(), volume);
            }

            snapshot.nodes.insert(name, node);
        }

        snapshot.taken_at = Some(SystemTime::now());
        Ok(snapshot)
    }

    /// Wakes [`run_until`](Self::run_until) for an immediate cycle.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Refreshes on a fixed interval, and on [`request_refresh`](Self::request_refresh),
    /// until `shutdown` resolves. The first cycle starts immediately.
    ///
    /// A cycle in flight when `shutdown` resolves runs to completion.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = if self.settings.interval < MIN_INTERVAL {
            warn!(interval = ?self.settings.interval, "Polling interval too short, using 1s");
            MIN_INTERVAL
        } else {
            self.settings.interval
        };
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval = ?period, "Polling started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
                _ = self.wake.notified() => debug!("Refresh requested"),
            }
            // Failures are logged and recorded in the status.
            let _ = self.refresh().await;
        }
        info!("Polling stopped");
    }

    /// Issues a power action on a guest of the current snapshot.
    ///
    /// Returns `false` for an unknown id. The snapshot is not refreshed.
    pub async fn guest_power_action(&self, vmid: u32, action: PowerAction) -> bool {
        match self.locate(vmid) {
            Some((node, kind)) => self.api.set_power_state(&node, vmid, kind, action).await,
            None => false,
        }
    }

    /// Reads the boot-on-start flag of a guest of the current snapshot.
    pub async fn guest_boot_on_start(&self, vmid: u32) -> Option<bool> {
        let (node, kind) = self.locate(vmid)?;
        self.api
            .get_guest_config(&node, vmid, kind)
            .await
            .map(|config| config.onboot())
    }

    pub async fn set_guest_boot_on_start(&self, vmid: u32, enabled: bool) -> bool {
        match self.locate(vmid) {
            Some((node, kind)) => {
                self.api
                    .set_guest_config(
                        &node,
                        vmid,
                        kind,
                        crate::core::domain::model::ONBOOT_FIELD,
                        serde_json::json!(u8::from(enabled)),
                    )
                    .await
            }
            None => false,
        }
    }

    fn locate(&self, vmid: u32) -> Option<(String, GuestKind)> {
        let snapshot = self.snapshot_tx.borrow();
        let located = snapshot
            .guest(vmid)
            .map(|guest| (guest.node.clone(), guest.kind));
        if located.is_none() {
            warn!(vmid, "Guest not found in current snapshot");
        }
        located
    }
}
