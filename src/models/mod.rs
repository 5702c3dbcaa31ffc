pub mod ballot;
pub mod option;
pub mod preferences;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ValidationError;
pub use ballot::Ballot;
pub use option::{NewOption, OptionInput, PollOption};
pub use preferences::{TimeFormat, UserPreferences};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteType {
    Yes,
    IfNeedBe,
    No,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Yes => "yes",
            VoteType::IfNeedBe => "ifNeedBe",
            VoteType::No => "no",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(VoteType::Yes),
            "ifNeedBe" => Some(VoteType::IfNeedBe),
            "no" => Some(VoteType::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub participant_id: String,
    pub option_id: String,
    pub vote_type: VoteType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub user_id: Option<String>,
    pub votes: Vec<Vote>,
}

impl Participant {
    /// The vote this participant cast for `option_id`, if any. `None` means
    /// nothing was recorded, which is not the same as an explicit `No`.
    pub fn vote_for(&self, option_id: &str) -> Option<VoteType> {
        self.votes
            .iter()
            .find(|vote| vote.option_id == option_id)
            .map(|vote| vote.vote_type)
    }
}

/// A participant about to be stored; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    pub color: Option<String>,
    pub user_id: Option<String>,
    pub votes: Vec<(String, VoteType)>,
}

/// Everything the store knows about a poll's voting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollBallots {
    pub poll_id: String,
    pub options: Vec<PollOption>,
    pub participants: Vec<Participant>,
}

/// First wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EventDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalendarView {
    Week,
    #[default]
    Month,
}

impl CalendarView {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarView::Week => "week",
            CalendarView::Month => "month",
        }
    }
}

/// Second wizard step: the candidate dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionsSelection {
    pub options: Vec<OptionInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub view: CalendarView,
}

impl PollOptionsSelection {
    /// Normalizes every option and checks the set as a whole.
    pub fn normalize(&self) -> Result<Vec<NewOption>, ValidationError> {
        if self.options.is_empty() {
            return Err(ValidationError::NoOptions);
        }
        // Zone problems are reported by `effective_time_zone`.
        let zone = self
            .time_zone
            .as_deref()
            .and_then(|zone| option::parse_time_zone(zone.trim()).ok());
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(self.options.len());
        for input in &self.options {
            let option = input.normalize_in(zone)?;
            if !seen.insert(option) {
                return Err(ValidationError::DuplicateOption(option.to_string()));
            }
            normalized.push(option);
        }
        Ok(normalized)
    }

    /// The zone only matters once a timed option is present.
    pub fn effective_time_zone(&self) -> Result<Option<String>, ValidationError> {
        if !self.options.iter().any(OptionInput::is_timed) {
            return Ok(None);
        }
        match self.time_zone.as_deref().map(str::trim) {
            Some(zone) if !zone.is_empty() => {
                option::parse_time_zone(zone)?;
                Ok(Some(zone.to_string()))
            }
            _ => Err(ValidationError::MissingTimeZone),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.normalize()?;
        self.effective_time_zone()?;
        Ok(())
    }
}

/// Last wizard step, shown to guests only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub name: String,
    pub contact: String,
}

impl UserDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        let contact = self.contact.trim();
        if contact.is_empty() {
            return Err(ValidationError::Empty { field: "contact" });
        }
        if !EMAIL.is_match(contact) {
            return Err(ValidationError::InvalidEmail(contact.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
    pub name: String,
    pub email: String,
}

/// Who is creating the poll, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Actor {
    Guest,
    Authenticated { id: String, name: String },
}

impl Actor {
    pub fn is_guest(&self) -> bool {
        matches!(self, Actor::Guest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Creator {
    Guest(UserContact),
    User { id: String, name: String },
}

/// The finished poll handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCreationRequest {
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub time_zone: Option<String>,
    pub view: CalendarView,
    pub options: Vec<NewOption>,
    pub creator: Creator,
}

impl PollCreationRequest {
    /// Contact details for guest creators.
    pub fn user(&self) -> Option<&UserContact> {
        match &self.creator {
            Creator::Guest(contact) => Some(contact),
            Creator::User { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPoll {
    pub id: String,
}
