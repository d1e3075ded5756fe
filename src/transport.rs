//! AMQP plumbing between the joint-state producer and the recorder.
//!
//! Messages travel as JSON bodies on a single queue. The
//! consumer side never touches the recorder; it only feeds the in-process
//! queue drained by [`crate::ingestion::run`].

use crate::config::BrokerSettings;
use crate::data_structure::JointStateMessage;
use crate::error::TransportError;
use futures_util::stream::StreamExt;
use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn connect(settings: &BrokerSettings) -> Result<(Connection, Channel), TransportError> {
    let conn = Connection::connect(&settings.uri, ConnectionProperties::default()).await?;
    let channel = conn.create_channel().await?;

    // limit batching and buffering latency
    channel
        .basic_qos(settings.prefetch, BasicQosOptions::default())
        .await?;

    channel
        .queue_declare(
            &settings.queue,
            QueueDeclareOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!(uri = %settings.uri, queue = %settings.queue, "connected to broker");
    Ok((conn, channel))
}

pub fn decode(payload: &[u8]) -> Result<JointStateMessage, serde_json::Error> {
    serde_json::from_slice(payload)
}

pub fn encode(msg: &JointStateMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(msg)
}

/// Consumes the joint-state queue and forwards decoded messages into `tx`.
///
/// Undecodable deliveries are nacked without requeue and dropped. Returns
/// once the consumer stream ends or the receiving side is closed.
pub async fn consume_joint_states(
    channel: Channel,
    queue: &str,
    tx: mpsc::Sender<JointStateMessage>,
) -> Result<(), TransportError> {
    let mut consumer = channel
        .basic_consume(
            queue,
            "joint_state_recorder",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "consumer stream error");
                continue;
            }
        };

        let msg = match decode(&delivery.data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "failed to decode joint-state message");
                delivery
                    .nack(BasicNackOptions {
                        requeue: false,
                        ..Default::default()
                    })
                    .await?;
                continue;
            }
        };

        if tx.send(msg).await.is_err() {
            // recorder is done; leave the delivery for someone else
            delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..Default::default()
                })
                .await?;
            debug!("ingestion queue closed, stopping consumer");
            return Ok(());
        }
        delivery.ack(BasicAckOptions::default()).await?;
    }

    Ok(())
}

/// Publishes every message received on `rx` to `queue` until the sender
/// side is dropped.
pub async fn publish_joint_states(
    channel: Channel,
    queue: &str,
    mut rx: mpsc::Receiver<JointStateMessage>,
) -> Result<u64, TransportError> {
    let mut published = 0u64;
    while let Some(msg) = rx.recv().await {
        let payload = encode(&msg)?;
        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default(),
            )
            .await?
            .await?;
        published += 1;
        debug!(published, position = ?msg.position, "published joint state");
    }
    Ok(published)
}
