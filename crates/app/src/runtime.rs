//! Bridge runtime — the single flow of control tying bus events, commands
//! and the poll timer together.
//!
//! The runtime owns the entity registry and the poll scheduler and lends
//! them to the dispatcher and the poller, so only one of them ever works on
//! the shared state at a time. Bus events that arrive while a bridge call is
//! in flight wait in the channel.
//!
//! 1. **Pairing** — the pairing future runs while connectivity events are
//!    served; commands are dropped.
//! 2. **Attach** — the bridge is installed, `2` is published on the
//!    connectivity topic and the first poll cycle runs.
//! 3. **Serve** — commands are dispatched (each success triggers a poll) and
//!    the scheduler drives periodic polls, until the event channel closes.

use std::future::Future;

use tokio::sync::mpsc;

use huemqtt_domain::command::Command;
use huemqtt_domain::connectivity::ConnectivityStatus;
use huemqtt_domain::topic::Topics;

use crate::ports::{BridgeClient, BusEvent, BusPublisher};
use crate::registry::EntityRegistry;
use crate::scheduler::PollScheduler;
use crate::services::connectivity::ConnectivityPublisher;
use crate::services::dispatcher::{CommandDispatcher, CommandOutcome};
use crate::services::pairing::PairingError;
use crate::services::poller::{PollReport, PollSettings, StatePoller};

/// Translation engine between the bus and one device bridge.
pub struct BridgeRuntime<B, P> {
    topics: Topics,
    bridge: Option<B>,
    registry: EntityRegistry,
    scheduler: PollScheduler,
    dispatcher: CommandDispatcher,
    poller: StatePoller<P>,
    connectivity: ConnectivityPublisher<P>,
    bus_connected: bool,
}

impl<B, P> BridgeRuntime<B, P>
where
    B: BridgeClient,
    P: BusPublisher + Clone,
{
    /// Create an unpaired runtime publishing through `publisher`.
    pub fn new(topics: Topics, publisher: P, settings: PollSettings) -> Self {
        Self {
            connectivity: ConnectivityPublisher::new(publisher.clone(), &topics),
            poller: StatePoller::new(publisher, topics.clone(), settings),
            dispatcher: CommandDispatcher,
            registry: EntityRegistry::default(),
            scheduler: PollScheduler::default(),
            bridge: None,
            bus_connected: false,
            topics,
        }
    }

    /// Run until the event channel closes.
    ///
    /// # Errors
    ///
    /// Returns the [`PairingError`] produced by `pairing`; the runtime does
    /// not continue without a bridge.
    pub async fn run<F>(
        mut self,
        pairing: F,
        mut events: mpsc::Receiver<BusEvent>,
    ) -> Result<(), PairingError>
    where
        F: Future<Output = Result<B, PairingError>>,
    {
        let mut pairing = std::pin::pin!(pairing);
        loop {
            tokio::select! {
                result = &mut pairing => {
                    self.attach(result?).await;
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await;
                    }
                    None => return Ok(()),
                },
            }
        }

        loop {
            tokio::select! {
                () = self.scheduler.expired() => {
                    self.poll().await;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await;
                    }
                    None => break,
                },
            }
        }
        tracing::info!("bus event stream closed, stopping");
        Ok(())
    }

    /// Install the authorised bridge, announce it and run the first poll.
    pub async fn attach(&mut self, bridge: B) -> Option<PollReport> {
        self.bridge = Some(bridge);
        tracing::info!("bridge paired and ready");
        self.publish_connectivity().await;
        self.poll().await
    }

    /// Handle one bus event. Returns the command outcome for messages.
    pub async fn handle_event(&mut self, event: BusEvent) -> Option<CommandOutcome> {
        match event {
            BusEvent::Connected => {
                tracing::info!("connected to message bus");
                self.bus_connected = true;
                self.publish_connectivity().await;
                None
            }
            BusEvent::Disconnected => {
                if self.bus_connected {
                    tracing::warn!("disconnected from message bus");
                }
                self.bus_connected = false;
                None
            }
            BusEvent::Message { topic, payload } => {
                Some(self.handle_message(&topic, &payload).await)
            }
        }
    }

    async fn handle_message(&mut self, topic: &str, payload: &[u8]) -> CommandOutcome {
        let Some(bridge) = &self.bridge else {
            tracing::debug!(%topic, "bridge not paired yet, dropping message");
            return CommandOutcome::NotPaired;
        };
        let Some(command) = Command::from_message(&self.topics, topic, payload) else {
            tracing::debug!(%topic, "ignoring message on unrecognised topic");
            return CommandOutcome::Unrecognised;
        };
        tracing::debug!(%topic, "handling command");

        let outcome = self
            .dispatcher
            .dispatch(bridge, &self.registry, &mut self.scheduler, command)
            .await;
        if outcome.is_applied() {
            self.poll().await;
        }
        outcome
    }

    /// Run one poll cycle now. `None` while unpaired.
    pub async fn poll(&mut self) -> Option<PollReport> {
        let bridge = self.bridge.as_ref()?;
        Some(
            self.poller
                .run_cycle(bridge, &mut self.registry, &mut self.scheduler)
                .await,
        )
    }

    async fn publish_connectivity(&self) {
        let status = ConnectivityStatus::connected(self.bridge.is_some());
        if let Err(err) = self.connectivity.publish(status).await {
            tracing::warn!(error = %err, %status, "failed to publish connectivity status");
        }
    }

    /// Current entity snapshots.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The poll timer.
    #[must_use]
    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Whether a bridge is attached.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.bridge.is_some()
    }
}
