use async_trait::async_trait;
use domain_approval::{model::vo::ApprovalMessage, service::NotificationSink};

/// Queues messages for the delivery task.
pub struct ChannelNotificationSink {
    sender: flume::Sender<ApprovalMessage>,
}

impl ChannelNotificationSink {
    pub fn new() -> (Self, flume::Receiver<ApprovalMessage>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelNotificationSink {
    async fn send(&self, msg: ApprovalMessage) -> anyhow::Result<()> {
        Ok(self.sender.send_async(msg).await?)
    }
}

/// Drain the queue until every sender is gone.
pub async fn deliver_notifications(receiver: flume::Receiver<ApprovalMessage>) {
    while let Ok(msg) = receiver.recv_async().await {
        tracing::info!(
            to = %msg.to,
            record = %msg.record_id,
            kind = ?msg.kind,
            "{}",
            msg.content
        );
    }
    tracing::debug!("Notification channel closed.");
}
