use log::{info, warn};

use crate::db::PollStore;
use crate::error::Error;
use crate::models::{Ballot, Participant};
use crate::voting::{PollResults, calculate_results};

// Presentation tags handed out to participants in turn.
const PARTICIPANT_COLORS: [&str; 8] = [
    "sky", "violet", "pink", "amber", "emerald", "rose", "indigo", "teal",
];

/// Validates a ballot against the poll's options and stores it as a new
/// participant.
pub async fn submit_ballot<S>(store: &S, poll_id: &str, ballot: Ballot) -> Result<Participant, Error>
where
    S: PollStore + ?Sized,
{
    let existing = store.fetch_ballots(poll_id).await?;
    if let Err(e) = ballot.validate(&existing.options) {
        warn!("Rejected ballot for poll {}: {}", poll_id, e);
        return Err(e.into());
    }

    let color = PARTICIPANT_COLORS[existing.participants.len() % PARTICIPANT_COLORS.len()];
    let participant = ballot.into_new_participant(&existing.options, Some(color.to_string()));
    let stored = store.add_participant(poll_id, &participant).await?;

    info!(
        "Recorded {} votes from {} on poll {}",
        stored.votes.len(),
        stored.name,
        poll_id
    );
    Ok(stored)
}

/// Fetches the current ballots and aggregates them. Nothing is cached, so the
/// result always reflects the store as it is now.
pub async fn poll_results<S>(store: &S, poll_id: &str) -> Result<PollResults, Error>
where
    S: PollStore + ?Sized,
{
    let ballots = store.fetch_ballots(poll_id).await?;
    Ok(calculate_results(&ballots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::{StoreError, ValidationError};
    use crate::models::{
        CalendarView, Creator, NewOption, OptionInput, PollCreationRequest, UserContact, VoteType,
    };

    async fn seeded() -> (MemoryStore, String, Vec<String>) {
        let store = MemoryStore::new();
        let options: Vec<NewOption> = ["2024-01-10", "2024-01-11"]
            .iter()
            .map(|d| OptionInput::date(*d).normalize().unwrap())
            .collect();
        let request = PollCreationRequest {
            title: "Lunch".to_string(),
            location: None,
            description: None,
            time_zone: None,
            view: CalendarView::Month,
            options,
            creator: Creator::Guest(UserContact {
                name: "Alice".to_string(),
                email: "a@x.com".to_string(),
            }),
        };
        let created = store.create_poll(&request).await.unwrap();
        let option_ids = store
            .fetch_ballots(&created.id)
            .await
            .unwrap()
            .options
            .into_iter()
            .map(|o| o.id)
            .collect();
        (store, created.id, option_ids)
    }

    #[tokio::test]
    async fn two_yes_one_no() {
        let (store, poll_id, options) = seeded().await;
        let first = &options[0];

        let bob = submit_ballot(&store, &poll_id, Ballot::new("Bob").with_vote(first, VoteType::Yes))
            .await
            .unwrap();
        let cat = submit_ballot(&store, &poll_id, Ballot::new("Cat").with_vote(first, VoteType::No))
            .await
            .unwrap();
        let dan = submit_ballot(&store, &poll_id, Ballot::new("Dan").with_vote(first, VoteType::Yes))
            .await
            .unwrap();

        let results = poll_results(&store, &poll_id).await.unwrap();
        let tally = &results.tallies[0];
        assert_eq!(tally.yes_count(), 2);
        assert_eq!(tally.no_count(), 1);
        assert_eq!(tally.if_need_be_count(), 0);
        assert_eq!(tally.yes, vec![bob.id, dan.id]);
        assert_eq!(tally.no, vec![cat.id]);

        // Nobody answered the second date at all.
        assert_eq!(results.tallies[1].response_count(), 0);
        assert_eq!(results.tallies[1].no_response_count(results.participant_count), 3);
    }

    #[tokio::test]
    async fn colors_rotate_by_arrival() {
        let (store, poll_id, _) = seeded().await;
        let first = submit_ballot(&store, &poll_id, Ballot::new("Bob")).await.unwrap();
        let second = submit_ballot(&store, &poll_id, Ballot::new("Cat")).await.unwrap();
        assert_eq!(first.color.as_deref(), Some("sky"));
        assert_eq!(second.color.as_deref(), Some("violet"));
        assert!(first.votes.is_empty());
    }

    #[tokio::test]
    async fn ballot_for_foreign_option_is_not_stored() {
        let (store, poll_id, _) = seeded().await;
        let err = submit_ballot(
            &store,
            &poll_id,
            Ballot::new("Bob").with_vote("not-an-option", VoteType::Yes),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnknownOption(_))
        ));
        assert!(store.fetch_ballots(&poll_id).await.unwrap().participants.is_empty());
    }

    #[tokio::test]
    async fn unknown_poll_is_a_store_error() {
        let store = MemoryStore::new();
        let err = poll_results(&store, "missing").await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound(_))));
    }
}
