use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{Actor, EventDetails, PollOptionsSelection, UserDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    EventDetails,
    Options,
    UserDetails,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::EventDetails => "eventDetails",
            Step::Options => "options",
            Step::UserDetails => "userDetails",
        }
    }
}

const GUEST_STEPS: [Step; 3] = [Step::EventDetails, Step::Options, Step::UserDetails];
// Signed-in users already have a name and address on file.
const USER_STEPS: [Step; 2] = [Step::EventDetails, Step::Options];

pub fn steps_for(actor: &Actor) -> &'static [Step] {
    match actor {
        Actor::Guest => &GUEST_STEPS,
        Actor::Authenticated { .. } => &USER_STEPS,
    }
}

/// Input for one step, tagged with the step it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "camelCase")]
pub enum StepData {
    EventDetails(EventDetails),
    Options(PollOptionsSelection),
    UserDetails(UserDetails),
}

impl StepData {
    pub fn step(&self) -> Step {
        match self {
            StepData::EventDetails(_) => Step::EventDetails,
            StepData::Options(_) => Step::Options,
            StepData::UserDetails(_) => Step::UserDetails,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StepData::EventDetails(details) => details.validate(),
            StepData::Options(selection) => selection.validate(),
            StepData::UserDetails(user) => user.validate(),
        }
    }
}
