use serde::Serialize;

use crate::models::{Participant, PollOption, VoteType};

/// Who answered what for one option. Bucket order follows the participant
/// list, never the order votes were submitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub option_id: String,
    pub yes: Vec<String>,
    pub if_need_be: Vec<String>,
    pub no: Vec<String>,
}

impl OptionTally {
    fn empty(option_id: &str) -> Self {
        Self {
            option_id: option_id.to_string(),
            yes: Vec::new(),
            if_need_be: Vec::new(),
            no: Vec::new(),
        }
    }

    pub fn yes_count(&self) -> usize {
        self.yes.len()
    }

    pub fn if_need_be_count(&self) -> usize {
        self.if_need_be.len()
    }

    pub fn no_count(&self) -> usize {
        self.no.len()
    }

    pub fn response_count(&self) -> usize {
        self.yes_count() + self.if_need_be_count() + self.no_count()
    }

    /// Participants that recorded nothing for this option.
    pub fn no_response_count(&self, participant_count: usize) -> usize {
        participant_count.saturating_sub(self.response_count())
    }

    pub fn bucket(&self, vote: VoteType) -> &[String] {
        match vote {
            VoteType::Yes => &self.yes,
            VoteType::IfNeedBe => &self.if_need_be,
            VoteType::No => &self.no,
        }
    }
}

/// Tallies every option, in option order.
pub fn tally_options(options: &[PollOption], participants: &[Participant]) -> Vec<OptionTally> {
    options
        .iter()
        .map(|option| tally_option(option, participants))
        .collect()
}

pub fn tally_option(option: &PollOption, participants: &[Participant]) -> OptionTally {
    let mut tally = OptionTally::empty(&option.id);
    for participant in participants {
        match participant.vote_for(&option.id) {
            Some(VoteType::Yes) => tally.yes.push(participant.id.clone()),
            Some(VoteType::IfNeedBe) => tally.if_need_be.push(participant.id.clone()),
            Some(VoteType::No) => tally.no.push(participant.id.clone()),
            None => {}
        }
    }
    tally
}
