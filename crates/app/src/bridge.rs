//! Bridge lifecycle — wires the engines to the scheduler and the item bus.
//!
//! `start()` marks the bridge live and spawns two tasks: the poll loop
//! (periodic tick plus the force-poll trigger) and the command dispatcher
//! (item bus subscriber). `stop()` marks it not-live — the dispatcher then
//! drops incoming writes — stops both tasks and tears down the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::dispatch::CommandDispatcher;
use crate::item_bus::ItemEventBus;
use crate::poll::PollEngine;
use crate::ports::GatewayClient;
use crate::registry::ItemRegistry;
use crate::session::Session;

/// The assembled bridge: registry, engines, session, and scheduler.
pub struct Bridge<G> {
    gateway: Arc<G>,
    registry: Arc<ItemRegistry>,
    bus: ItemEventBus,
    session: Arc<Session<G>>,
    live: Arc<AtomicBool>,
    poll_trigger: Arc<Notify>,
    cycle: Duration,
    shutdown: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<G: GatewayClient + 'static> Bridge<G> {
    /// Assemble a bridge over the given gateway and registry.
    ///
    /// `cycle` is the fixed poll interval, supplied at startup for the
    /// process lifetime.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<ItemRegistry>,
        bus: ItemEventBus,
        cycle: Duration,
    ) -> Self {
        let session = Arc::new(Session::new(Arc::clone(&gateway)));
        Self {
            gateway,
            registry,
            bus,
            session,
            live: Arc::new(AtomicBool::new(false)),
            poll_trigger: Arc::new(Notify::new()),
            cycle,
            shutdown: None,
            tasks: Vec::new(),
        }
    }

    /// The item bus carrying all item writes.
    #[must_use]
    pub fn bus(&self) -> &ItemEventBus {
        &self.bus
    }

    /// The shared item registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    /// The gateway session (for the initial connect and for watchdogs).
    #[must_use]
    pub fn session(&self) -> &Arc<Session<G>> {
        &self.session
    }

    /// Trigger handle that forces an immediate poll tick.
    #[must_use]
    pub fn poll_trigger(&self) -> Arc<Notify> {
        Arc::clone(&self.poll_trigger)
    }

    /// Whether the bridge is currently live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Mark the bridge live and spawn the poll loop and the dispatcher.
    ///
    /// The first poll tick fires immediately. Calling `start` twice is a
    /// no-op.
    pub fn start(&mut self) {
        if self.shutdown.is_some() {
            tracing::debug!("bridge already started");
            return;
        }
        tracing::info!(cycle_secs = self.cycle.as_secs(), "starting bridge");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown = Some(shutdown_tx);
        self.live.store(true, Ordering::SeqCst);

        let dispatcher = CommandDispatcher::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.registry),
            Arc::clone(&self.live),
            Arc::clone(&self.poll_trigger),
        );
        let events = self.bus.subscribe();
        let mut dispatcher_shutdown = shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                () = dispatcher.run(events) => {}
                _ = dispatcher_shutdown.changed() => {}
            }
        }));

        let engine = PollEngine::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.registry),
            self.bus.clone(),
        );
        let trigger = Arc::clone(&self.poll_trigger);
        let cycle = self.cycle;
        let mut poll_shutdown = shutdown_rx;
        self.tasks.push(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(cycle);
            // A tick that fires while a poll is still in flight waits for
            // the next full cycle instead of bursting.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticks.tick() => engine.poll().await,
                    () = trigger.notified() => engine.poll().await,
                    _ = poll_shutdown.changed() => break,
                }
            }
        }));
    }

    /// Mark the bridge not-live, stop both tasks, and disconnect.
    pub async fn stop(&mut self) {
        tracing::info!("stopping bridge");
        self.live.store(false, Ordering::SeqCst);
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        self.session.disconnect().await;
    }
}
