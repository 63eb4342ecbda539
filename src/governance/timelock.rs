use chrono::{DateTime, Duration, Utc};

use super::error::{GovernanceError, GovernanceResult};
use super::types::Proposal;

/// Arms a fixed confirmation delay the first time a proposal reaches its
/// threshold. The delay is fixed at construction; no dispatched action can
/// change it.
#[derive(Debug, Clone, Copy)]
pub struct TimelockGate {
    confirmation_delay: Duration,
}

impl TimelockGate {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self { confirmation_delay }
    }

    pub fn confirmation_delay(&self) -> Duration {
        self.confirmation_delay
    }

    /// Set `execute_time = now + delay` if unset and the signature count has
    /// reached `threshold`. Returns the newly armed time, `None` otherwise.
    ///
    /// The proposal is left untouched when the execute time overflows.
    pub fn try_arm(
        &self,
        proposal: &mut Proposal,
        threshold: usize,
        now: DateTime<Utc>,
    ) -> GovernanceResult<Option<DateTime<Utc>>> {
        if proposal.execute_time.is_some() || proposal.signatures.len() < threshold {
            return Ok(None);
        }

        let execute_time = now.checked_add_signed(self.confirmation_delay).ok_or(
            GovernanceError::ExecuteTimeOutOfRange {
                now,
                delay_secs: self.confirmation_delay.num_seconds(),
            },
        )?;
        proposal.execute_time = Some(execute_time);
        Ok(Some(execute_time))
    }

    pub fn is_ready(&self, proposal: &Proposal, now: DateTime<Utc>) -> bool {
        match proposal.execute_time {
            Some(execute_time) => now >= execute_time,
            None => false,
        }
    }
}
