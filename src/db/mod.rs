pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{CreatedPoll, NewParticipant, Participant, PollBallots, PollCreationRequest, UserPreferences};

pub use memory::MemoryStore;
pub use sqlite::Database;

/// The persistence boundary. Everything behind it is someone else's problem;
/// the engine only ever talks to this trait.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Persists a finished poll and returns its new identity.
    async fn create_poll(&self, request: &PollCreationRequest) -> Result<CreatedPoll, StoreError>;

    /// Options plus participants (with their votes), both in display order.
    async fn fetch_ballots(&self, poll_id: &str) -> Result<PollBallots, StoreError>;

    async fn add_participant(
        &self,
        poll_id: &str,
        participant: &NewParticipant,
    ) -> Result<Participant, StoreError>;

    async fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError>;

    async fn upsert_user_preferences(
        &self,
        user_id: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError>;

    async fn delete_user_preferences(&self, user_id: &str) -> Result<(), StoreError>;
}
