//! Block-interval trigger
//!
//! Eligible blocks are `start_block + k * interval`. The trigger follows the
//! chain head and hands out each eligible block once, in ascending order.
//! It starts at the head it first sees: blocks before that are never fired.

use async_trait::async_trait;

use crate::services::reserve_fetcher::ReserveFetchError;

/// Read access to the chain head
#[async_trait]
pub trait ChainHead: Send + Sync {
    async fn latest_block_number(&self) -> Result<u64, ReserveFetchError>;

    /// Unix seconds
    async fn block_timestamp(&self, block_number: u64) -> Result<u64, ReserveFetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSchedule {
    start_block: u64,
    interval: u64,
}

impl BlockSchedule {
    /// An interval of zero is treated as one
    pub fn new(start_block: u64, interval: u64) -> Self {
        Self {
            start_block,
            interval: interval.max(1),
        }
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn is_due(&self, block_number: u64) -> bool {
        block_number >= self.start_block && (block_number - self.start_block) % self.interval == 0
    }

    /// First eligible block at or after `block_number`
    pub fn first_at_or_after(&self, block_number: u64) -> u64 {
        if block_number <= self.start_block {
            return self.start_block;
        }
        let offset = block_number - self.start_block;
        self.start_block + offset.div_ceil(self.interval) * self.interval
    }
}

pub struct BlockTrigger {
    schedule: BlockSchedule,
    next_block: Option<u64>,
}

impl BlockTrigger {
    pub fn new(schedule: BlockSchedule) -> Self {
        Self {
            schedule,
            next_block: None,
        }
    }

    pub fn schedule(&self) -> &BlockSchedule {
        &self.schedule
    }

    /// Next block that will be handed out, once the head has been seen
    pub fn next_block(&self) -> Option<u64> {
        self.next_block
    }

    /// Eligible blocks up to the current head that have not been fired yet
    pub async fn due_blocks(&mut self, chain: &dyn ChainHead) -> Result<Vec<u64>, ReserveFetchError> {
        let head = chain.latest_block_number().await?;
        let next = match self.next_block {
            Some(next) => next,
            None => {
                let first = self.schedule.first_at_or_after(head);
                self.next_block = Some(first);
                first
            }
        };

        if next > head {
            return Ok(Vec::new());
        }

        let step = self.schedule.interval as usize;
        Ok((next..=head).step_by(step).collect())
    }

    /// Advance past `block_number` after it has been handled
    pub fn mark_fired(&mut self, block_number: u64) {
        self.next_block = Some(block_number + self.schedule.interval);
    }
}
