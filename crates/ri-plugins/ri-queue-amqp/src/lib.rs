//! # ri-queue-amqp
//! rusty-illust/crates/ri-queue-amqp/src/lib.rs
//! AMQP implementation of `TaskQueue` over lapin.
//!
//! The queue is declared durable/non-exclusive/non-auto-delete before the
//! first publish, and every task is published with delivery mode 2 so it
//! survives a broker restart before a worker consumes it.

use anyhow::Context;
use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use ri_core::models::ProcessingTask;
use ri_core::traits::TaskQueue;

/// The well-known queue the scaling worker consumes from.
pub const SCALING_QUEUE: &str = "scaling_queue";

const PERSISTENT_DELIVERY: u8 = 2;

pub struct AmqpTaskQueue {
    // The channel only stays usable while its connection lives.
    _conn: Connection,
    channel: Channel,
    queue: String,
}

impl AmqpTaskQueue {
    /// Connects, opens a channel, and declares the queue. Declaring is
    /// idempotent on the broker side as long as the durability flags match.
    pub async fn connect(uri: &str, queue: &str) -> anyhow::Result<Self> {
        let conn = Connection::connect(uri, ConnectionProperties::default())
            .await
            .with_context(|| format!("amqp connect to {uri}"))?;
        let channel = conn.create_channel().await.context("amqp channel open")?;

        // Without confirm mode the broker never reports publish outcomes and
        // every PublisherConfirm resolves to NotRequested.
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .context("enable publisher confirms")?;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .with_context(|| format!("declare queue '{queue}'"))?;

        Ok(Self {
            _conn: conn,
            channel,
            queue: queue.to_string(),
        })
    }
}

/// Serializes one task into its wire payload (self-describing JSON, field
/// names fixed by the worker contract).
pub fn encode_task(task: &ProcessingTask) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(task)
}

/// A task counts as dispatched only on a broker ack. `NotRequested` means
/// the channel is not in confirm mode, which defeats the durability contract
/// just as surely as a nack.
fn ensure_acked(confirmation: Confirmation, hash: &str) -> anyhow::Result<()> {
    match confirmation {
        Confirmation::Ack(_) => Ok(()),
        Confirmation::Nack(_) => anyhow::bail!("broker nacked scaling task for {hash}"),
        Confirmation::NotRequested => {
            anyhow::bail!("publisher confirms are not enabled on this channel")
        }
    }
}

#[async_trait]
impl TaskQueue for AmqpTaskQueue {
    async fn publish(&self, task: &ProcessingTask) -> anyhow::Result<()> {
        let payload = encode_task(task).context("encode scaling task")?;

        let confirm = self
            .channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_delivery_mode(PERSISTENT_DELIVERY)
                    .with_content_type("application/json".into()),
            )
            .await
            .with_context(|| format!("publish task for {}", task.hash))?;
        let confirmation = confirm.await.context("broker ack")?;
        ensure_acked(confirmation, &task.hash)?;

        log::debug!("dispatched scaling task for {}", task.hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ri_core::models::Extent;

    #[test]
    fn payload_matches_the_worker_contract() {
        let task = ProcessingTask {
            hash: "feedface".into(),
            crop_position: Extent::new(0, 100),
            crop_size: Extent::square(600),
            scales: [Extent::square(128)].into_iter().collect(),
        };

        let payload = encode_task(&task).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(json["hash"], "feedface");
        assert_eq!(json["cropPosition"]["y"], 100);
        assert_eq!(json["cropSize"]["x"], 600);
        assert_eq!(json["scales"][0]["x"], 128);
    }

    #[test]
    fn only_broker_acks_count_as_delivered() {
        assert!(ensure_acked(Confirmation::Ack(None), "h").is_ok());
        assert!(ensure_acked(Confirmation::Nack(None), "h").is_err());
        // NotRequested means confirm_select never ran; treating it as success
        // would silently drop the delivery guarantee.
        assert!(ensure_acked(Confirmation::NotRequested, "h").is_err());
    }
}
