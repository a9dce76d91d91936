//! Unlock gating for the build menu.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Milestone rewards that unlock buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    Stacker,
    LogicGates,
    WiresPaintersAndLevers,
    VirtualProcessing,
    Display,
}

/// Read-only progression state, as seen by availability checks.
pub trait Progression {
    fn is_reward_unlocked(&self, reward: Reward) -> bool;
}

/// Whether a variant may be picked from the build menu.
///
/// Stored as data so evaluation is pure over the progression snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Always,
    Never,
    Reward(Reward),
}

impl Availability {
    pub fn evaluate(&self, progression: &dyn Progression) -> bool {
        match self {
            Availability::Always => true,
            Availability::Never => false,
            Availability::Reward(reward) => progression.is_reward_unlocked(*reward),
        }
    }
}

/// A plain set of unlocked rewards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnlockedRewards {
    rewards: BTreeSet<Reward>,
}

impl UnlockedRewards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the reward was newly unlocked.
    pub fn unlock(&mut self, reward: Reward) -> bool {
        self.rewards.insert(reward)
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl FromIterator<Reward> for UnlockedRewards {
    fn from_iter<I: IntoIterator<Item = Reward>>(iter: I) -> Self {
        Self {
            rewards: iter.into_iter().collect(),
        }
    }
}

impl Progression for UnlockedRewards {
    fn is_reward_unlocked(&self, reward: Reward) -> bool {
        self.rewards.contains(&reward)
    }
}
