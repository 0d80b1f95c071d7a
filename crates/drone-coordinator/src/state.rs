//! Shared application state, assembled once in `main` and handed to every
//! background loop as cheap `Arc` clones.

use crate::config::Config;
use crate::dispatch::{DispatchEngine, DispatchState, PriorityQueue};
use crate::registry::{UnitRegistry, ZoneRegistry};
use drone_protocol::Transport;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct AppState {
    pub zones: Arc<ZoneRegistry>,
    pub units: Arc<UnitRegistry>,
    pub dispatch_state: Arc<DispatchState>,
    pub queue: Arc<PriorityQueue>,
    pub transport: Arc<Transport>,
    pub engine: Arc<DispatchEngine>,
    pub idle_followup_tx: mpsc::Sender<String>,
    pub idle_followup_rx: tokio::sync::Mutex<mpsc::Receiver<String>>,
    pub running: Arc<AtomicBool>,
    pub config: Config,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, transport: Transport, zones: Vec<drone_domain::Zone>) -> Self {
        let zones = Arc::new(crate::registry::ZoneRegistry::with_zones(zones));
        let units = Arc::new(UnitRegistry::new());
        let dispatch_state = Arc::new(DispatchState::new());
        let queue = Arc::new(PriorityQueue::new());
        let transport = Arc::new(transport);

        let engine = Arc::new(DispatchEngine::new(
            zones.clone(),
            units.clone(),
            dispatch_state.clone(),
            queue.clone(),
            transport.clone(),
        ));

        let (idle_followup_tx, idle_followup_rx) = mpsc::channel(256);

        Self {
            zones,
            units,
            dispatch_state,
            queue,
            transport,
            engine,
            idle_followup_tx,
            idle_followup_rx: tokio::sync::Mutex::new(idle_followup_rx),
            running: Arc::new(AtomicBool::new(true)),
            config,
        }
    }
}
