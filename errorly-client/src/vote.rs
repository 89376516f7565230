use std::fmt;

use crate::{
    api::{Reply, Target, VoteRequest},
    Error, Precondition, Store,
};

/// Sentiment the user asks for
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn from_positive(positive: bool) -> Direction {
        match positive {
            true => Direction::Positive,
            false => Direction::Negative,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Direction::Positive
    }
}

/// What the current user currently holds on a target
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum VoteState {
    #[default]
    Absent,
    Positive,
    Negative,
}

impl VoteState {
    pub fn direction(self) -> Option<Direction> {
        match self {
            VoteState::Absent => None,
            VoteState::Positive => Some(Direction::Positive),
            VoteState::Negative => Some(Direction::Negative),
        }
    }
}

impl From<Direction> for VoteState {
    fn from(d: Direction) -> VoteState {
        match d {
            Direction::Positive => VoteState::Positive,
            Direction::Negative => VoteState::Negative,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VoteOp {
    Create,
    /// Flip an existing vote to the other direction
    Update,
    /// Remove the vote, when asking again for the direction already held
    Delete,
}

impl VoteOp {
    pub fn decide(current: VoteState, requested: Direction) -> VoteOp {
        match current.direction() {
            None => VoteOp::Create,
            Some(d) if d == requested => VoteOp::Delete,
            Some(_) => VoteOp::Update,
        }
    }
}

impl fmt::Display for VoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteOp::Create => "create",
            VoteOp::Update => "update",
            VoteOp::Delete => "delete",
        })
    }
}

/// A vote cast, decided from the local state at the time it was issued
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VotePlan {
    pub target: Target,
    pub op: VoteOp,
    pub direction: Direction,
}

impl VotePlan {
    pub fn request(&self) -> VoteRequest {
        let positive = match self.op {
            VoteOp::Delete => None,
            VoteOp::Create | VoteOp::Update => Some(self.direction.is_positive()),
        };
        VoteRequest::new(self.target, positive)
    }

    /// State the user holds once the backend confirmed this plan
    pub fn outcome(&self) -> VoteState {
        match self.op {
            VoteOp::Delete => VoteState::Absent,
            VoteOp::Create | VoteOp::Update => self.direction.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteOutcome {
    pub op: VoteOp,
    pub state: VoteState,
    pub score: i64,
}

impl Store {
    pub fn plan_vote(&self, target: Target, direction: Direction) -> Result<VotePlan, Error> {
        if !self.contains(target) {
            return Err(Precondition::unknown_target(target).into());
        }
        Ok(VotePlan {
            target,
            op: VoteOp::decide(self.vote(target), direction),
            direction,
        })
    }

    /// Applies the backend's answer to `plan`
    ///
    /// Nothing is changed if the answer does not carry the target's score.
    /// If the target was unloaded meanwhile, the vote is not recorded either.
    /// Answers are applied in whatever order they arrive: the last one wins.
    pub fn apply_vote(&mut self, plan: &VotePlan, reply: &Reply) -> Result<VoteOutcome, Error> {
        let score = reply.score_of(plan.target)?;
        let state = plan.outcome();
        if self.patch_score(plan.target, score) {
            self.set_vote(plan.target, state);
        }
        Ok(VoteOutcome {
            op: plan.op,
            state,
            score,
        })
    }
}
