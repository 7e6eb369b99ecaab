//! Helper-side marker for actors recruited to someone else's task.

use serde::{Deserialize, Serialize};

use super::{ActivityId, ActorId};

/// Inert binding on a helper, pointing at the leader's foreground record.
/// Carries no work budget of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistBinding {
    pub leader: ActorId,
    pub activity: ActivityId,
    /// Turn the helper was recruited.
    pub since: u64,
}
