//! Broker connection — options, last will and the event-loop task.
//!
//! rumqttc does not restore subscriptions after a reconnect, so the task
//! subscribes again on every `ConnAck`. Polling the event loop after an
//! error makes rumqttc reconnect.
//!
//! The event-loop task is the only thing draining the client's request
//! channel, and the runtime may be blocked publishing into it. The task
//! therefore never awaits a channel: subscriptions are issued from a
//! separate task, and bus events are handed over with `try_send`.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS, SubscribeFilter};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use huemqtt_app::ports::BusEvent;
use huemqtt_domain::connectivity::ConnectivityStatus;
use huemqtt_domain::topic::Topics;

use crate::config::MqttConfig;
use crate::publisher::MqttPublisher;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// A started broker connection.
pub struct MqttConnection {
    /// Publisher feeding the connection.
    pub publisher: MqttPublisher,
    /// Connection changes and inbound messages, in arrival order.
    pub events: mpsc::Receiver<BusEvent>,
    /// The event-loop task. It ends once `events` is dropped.
    pub task: JoinHandle<()>,
}

/// Build the client options for `config`.
#[must_use]
pub fn options(config: &MqttConfig, topics: &Topics) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
    options.set_last_will(LastWill::new(
        topics.connected(),
        ConnectivityStatus::Offline.as_payload(),
        QoS::AtMostOnce,
        true,
    ));
    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }
    options
}

/// Start connecting to the broker in a background task.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn connect(config: &MqttConfig, topics: &Topics) -> MqttConnection {
    let capacity = config.channel_capacity.max(1);
    let (client, eventloop) = AsyncClient::new(options(config, topics), capacity);
    let (sender, events) = mpsc::channel(capacity);
    tracing::info!(host = %config.host, port = config.port, client_id = %config.client_id, "connecting to broker");

    let task = tokio::spawn(drive(
        eventloop,
        client.clone(),
        topics.subscriptions(),
        EventForwarder::new(sender),
    ));

    MqttConnection {
        publisher: MqttPublisher::new(client),
        events,
        task,
    }
}

/// The receiving side of the bus events is gone.
#[derive(Debug, PartialEq, Eq)]
struct Closed;

/// Hands bus events to the runtime without ever waiting for room.
///
/// Inbound messages that find the queue full are dropped. Link changes are
/// coalesced instead: only the latest undelivered one is kept, and it goes
/// out before anything else once there is room.
#[derive(Debug)]
struct EventForwarder {
    events: mpsc::Sender<BusEvent>,
    pending_link: Option<BusEvent>,
    connected: bool,
}

impl EventForwarder {
    fn new(events: mpsc::Sender<BusEvent>) -> Self {
        Self {
            events,
            pending_link: None,
            connected: false,
        }
    }

    /// Record a link change. Repeated failures while already down are not
    /// reported again.
    fn link(&mut self, connected: bool) -> Result<(), Closed> {
        if !connected && !self.connected && self.pending_link.is_none() {
            return Ok(());
        }
        self.connected = connected;
        self.pending_link = Some(if connected {
            BusEvent::Connected
        } else {
            BusEvent::Disconnected
        });
        self.flush()
    }

    /// Try to deliver the pending link change.
    fn flush(&mut self) -> Result<(), Closed> {
        let Some(event) = self.pending_link.take() else {
            return Ok(());
        };
        match self.events.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                tracing::debug!(?event, "bus event queue full, holding link change");
                self.pending_link = Some(event);
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(Closed),
        }
    }

    /// Forward an inbound message, dropping it when the queue is full.
    fn message(&mut self, topic: String, payload: Vec<u8>) -> Result<(), Closed> {
        self.flush()?;
        match self.events.try_send(BusEvent::Message { topic, payload }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "bus event queue full, dropping message");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(Closed),
        }
    }
}

/// Subscribe to every command filter from a task of its own, so that a full
/// request channel never stalls the event loop.
fn resubscribe(client: &AsyncClient, subscriptions: &[String; 4]) {
    let client = client.clone();
    let filters: Vec<SubscribeFilter> = subscriptions
        .iter()
        .map(|filter| SubscribeFilter::new(filter.clone(), QoS::AtMostOnce))
        .collect();
    tokio::spawn(async move {
        match client.subscribe_many(filters).await {
            Ok(()) => tracing::debug!("subscription request queued"),
            Err(err) => tracing::error!(error = %err, "failed to subscribe"),
        }
    });
}

async fn drive(
    mut eventloop: EventLoop,
    client: AsyncClient,
    subscriptions: [String; 4],
    mut forwarder: EventForwarder,
) {
    loop {
        let forwarded = match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                resubscribe(&client, &subscriptions);
                forwarder.link(true)
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                forwarder.message(publish.topic, publish.payload.to_vec())
            }
            Ok(_) => forwarder.flush(),
            Err(err) => {
                tracing::warn!(error = %err, "broker connection error, retrying");
                let forwarded = forwarder.link(false);
                tokio::time::sleep(RECONNECT_DELAY).await;
                forwarded
            }
        };
        if forwarded.is_err() {
            break;
        }
    }
    tracing::debug!("bus event receiver dropped, stopping event loop");
}
