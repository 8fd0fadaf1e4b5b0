//! Graph write batcher
//!
//! Statements are queued in emission order and executed one by one in
//! fixed-size batches. A failed statement is logged and counted; it never
//! stops the batch or the run. After each batch the session is asked for a
//! checkpoint.

use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::statement::Statement;
use crate::store::GraphSession;

/// A statement the store rejected or failed to execute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStatement {
    /// Zero-based position in the flushed sequence
    pub position: usize,
    pub statement: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlushReport {
    pub total: usize,
    pub executed: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedStatement>,
    pub batches: usize,
    pub checkpoint_failures: usize,
    pub elapsed_ms: u64,
}

impl FlushReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[derive(Debug)]
pub struct WriteBatcher {
    queue: Vec<Statement>,
    batch_size: usize,
}

impl Default for WriteBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl WriteBatcher {
    /// A batch size of 0 is treated as 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            queue: Vec::new(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn enqueue(&mut self, statement: Statement) {
        self.queue.push(statement);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued statements, in execution order.
    pub fn pending(&self) -> &[Statement] {
        &self.queue
    }

    /// Take the queue without executing it.
    pub fn drain(&mut self) -> Vec<Statement> {
        std::mem::take(&mut self.queue)
    }

    /// Execute and clear the queue.
    pub async fn flush_all(&mut self, session: &dyn GraphSession) -> FlushReport {
        let statements = self.drain();
        let total = statements.len();
        let start = Instant::now();
        let mut report = FlushReport {
            total,
            ..FlushReport::default()
        };

        info!("{} statements waiting for execution", total);

        for (batch_idx, batch) in statements.chunks(self.batch_size).enumerate() {
            for (offset, statement) in batch.iter().enumerate() {
                let position = batch_idx * self.batch_size + offset;
                let failure = match session.execute(statement).await {
                    Ok(result) if result.succeeded => None,
                    Ok(result) => Some(
                        result
                            .error_message
                            .unwrap_or_else(|| "store reported failure".to_string()),
                    ),
                    Err(e) => Some(e.to_string()),
                };
                report.executed += 1;

                match failure {
                    None => report.succeeded += 1,
                    Some(message) => {
                        error!("Statement {} failed: {}", position, statement);
                        error!("Error detail: {}", message);
                        report.failed.push(FailedStatement {
                            position,
                            statement: statement.to_string(),
                            error: message,
                        });
                    }
                }
            }

            report.batches += 1;
            if let Err(e) = session.checkpoint().await {
                warn!("Checkpoint after batch {} failed: {}", report.batches, e);
                report.checkpoint_failures += 1;
            }
            info!(
                "Executed {} / {} statements ({} failed)",
                report.executed,
                total,
                report.failed.len()
            );
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        report
    }
}
