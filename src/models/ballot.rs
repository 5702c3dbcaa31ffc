use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{NewParticipant, PollOption, Vote, VoteType};
use crate::error::ValidationError;

/// One participant's answers across a poll's options. Options left out of
/// `votes` get no vote record at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub votes: BTreeMap<String, VoteType>,
}

impl Ballot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_vote(mut self, option_id: impl Into<String>, vote: VoteType) -> Self {
        self.votes.insert(option_id.into(), vote);
        self
    }

    pub fn validate(&self, options: &[PollOption]) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        for option_id in self.votes.keys() {
            if !options.iter().any(|option| &option.id == option_id) {
                return Err(ValidationError::UnknownOption(option_id.clone()));
            }
        }
        Ok(())
    }

    /// Votes in poll option order.
    pub fn to_votes(&self, participant_id: &str, options: &[PollOption]) -> Vec<Vote> {
        options
            .iter()
            .filter_map(|option| {
                self.votes.get(&option.id).map(|vote_type| Vote {
                    participant_id: participant_id.to_string(),
                    option_id: option.id.clone(),
                    vote_type: *vote_type,
                })
            })
            .collect()
    }

    pub fn into_new_participant(self, options: &[PollOption], color: Option<String>) -> NewParticipant {
        let votes = options
            .iter()
            .filter_map(|option| {
                self.votes
                    .get(&option.id)
                    .map(|vote_type| (option.id.clone(), *vote_type))
            })
            .collect();
        NewParticipant {
            name: self.name.trim().to_string(),
            color,
            user_id: self.user_id,
            votes,
        }
    }
}
