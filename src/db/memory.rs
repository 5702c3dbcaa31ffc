use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::PollStore;
use crate::error::StoreError;
use crate::models::{
    CreatedPoll, NewParticipant, Participant, PollBallots, PollCreationRequest, PollOption,
    UserPreferences, Vote,
};

#[derive(Debug, Default)]
struct Inner {
    requests: Vec<(String, PollCreationRequest)>,
    ballots: HashMap<String, PollBallots>,
    preferences: HashMap<String, UserPreferences>,
}

/// A store that lives in process memory. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every creation request received so far, with the id it was given.
    pub fn created_polls(&self) -> Vec<(String, PollCreationRequest)> {
        self.lock().map(|inner| inner.requests.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn create_poll(&self, request: &PollCreationRequest) -> Result<CreatedPoll, StoreError> {
        let id = Uuid::new_v4().to_string();
        let options = request
            .options
            .iter()
            .map(|option| PollOption {
                id: Uuid::new_v4().to_string(),
                start: option.start,
                duration: option.duration,
            })
            .collect();

        let mut inner = self.lock()?;
        inner.requests.push((id.clone(), request.clone()));
        inner.ballots.insert(
            id.clone(),
            PollBallots {
                poll_id: id.clone(),
                options,
                participants: Vec::new(),
            },
        );
        Ok(CreatedPoll { id })
    }

    async fn fetch_ballots(&self, poll_id: &str) -> Result<PollBallots, StoreError> {
        self.lock()?
            .ballots
            .get(poll_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll_id)))
    }

    async fn add_participant(
        &self,
        poll_id: &str,
        participant: &NewParticipant,
    ) -> Result<Participant, StoreError> {
        let mut inner = self.lock()?;
        let ballots = inner
            .ballots
            .get_mut(poll_id)
            .ok_or_else(|| StoreError::NotFound(format!("poll {}", poll_id)))?;

        let id = Uuid::new_v4().to_string();
        let stored = Participant {
            id: id.clone(),
            name: participant.name.clone(),
            color: participant.color.clone(),
            user_id: participant.user_id.clone(),
            votes: participant
                .votes
                .iter()
                .map(|(option_id, vote_type)| Vote {
                    participant_id: id.clone(),
                    option_id: option_id.clone(),
                    vote_type: *vote_type,
                })
                .collect(),
        };
        ballots.participants.push(stored.clone());
        Ok(stored)
    }

    async fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        Ok(self.lock()?.preferences.get(user_id).cloned())
    }

    async fn upsert_user_preferences(
        &self,
        user_id: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError> {
        self.lock()?
            .preferences
            .entry(user_id.to_string())
            .or_default()
            .merge(preferences);
        Ok(())
    }

    async fn delete_user_preferences(&self, user_id: &str) -> Result<(), StoreError> {
        self.lock()?
            .preferences
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("preferences for {}", user_id)))
    }
}
