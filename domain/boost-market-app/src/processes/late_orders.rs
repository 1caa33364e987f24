use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::workflow::order::mark_late::MarkLateOrdersWorkflow;

pub const LATE_ORDER_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct LateOrderJob<W: MarkLateOrdersWorkflow> {
    mark_late_workflow: Arc<W>,
    interval: Duration,
}

impl<W: MarkLateOrdersWorkflow + Send + Sync + 'static> LateOrderJob<W> {
    pub fn new(mark_late_workflow: Arc<W>, interval: Duration) -> Self {
        Self {
            mark_late_workflow,
            interval,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.mark_late_workflow.mark_late_orders(Utc::now()).await {
                log::error!("Late order check failed: {:?}", e);
            }
        }
    }
}
