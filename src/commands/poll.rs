use std::time::Duration;

use log::{debug, error, info, warn};

use crate::db::PollStore;
use crate::error::{Error, StoreError};
use crate::models::{Actor, CreatedPoll, Creator, PollCreationRequest, UserContact};
use crate::wizard::WizardState;

/// Assembles the creation request from everything the wizard collected.
///
/// Step validation has normally caught all of this already; a missing value
/// here means a step was skipped or the session state was corrupted.
pub fn build_request(state: &WizardState, actor: &Actor) -> Result<PollCreationRequest, Error> {
    let details = state
        .event_details
        .as_ref()
        .filter(|details| !details.title.trim().is_empty())
        .ok_or(Error::MissingField("title"))?;

    let selection = state
        .options
        .as_ref()
        .filter(|selection| !selection.options.is_empty())
        .ok_or(Error::MissingField("options"))?;
    let options = selection.normalize()?;
    let time_zone = selection.effective_time_zone()?;

    let creator = match actor {
        Actor::Guest => {
            let user = state.user_details.as_ref();
            let name = user
                .map(|user| user.name.trim())
                .filter(|name| !name.is_empty())
                .ok_or(Error::MissingField("name"))?;
            let email = user
                .map(|user| user.contact.trim())
                .filter(|contact| !contact.is_empty())
                .ok_or(Error::MissingField("contact"))?;
            Creator::Guest(UserContact {
                name: name.to_string(),
                email: email.to_string(),
            })
        }
        Actor::Authenticated { id, name } => {
            if state.user_details.is_some() {
                debug!("Dropping guest contact details, {} is signed in", id);
            }
            Creator::User {
                id: id.clone(),
                name: name.clone(),
            }
        }
    };

    Ok(PollCreationRequest {
        title: details.title.trim().to_string(),
        location: non_blank(&details.location),
        description: non_blank(&details.description),
        time_zone,
        view: selection.view,
        options,
        creator,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds the request and hands it to the store. The store is not touched
/// when the request cannot be built.
pub async fn submit_poll<S>(
    store: &S,
    state: &WizardState,
    actor: &Actor,
    timeout: Duration,
) -> Result<CreatedPoll, Error>
where
    S: PollStore + ?Sized,
{
    let request = match build_request(state, actor) {
        Ok(request) => request,
        Err(e) => {
            warn!("Refusing to submit poll: {}", e);
            return Err(e);
        }
    };

    match tokio::time::timeout(timeout, store.create_poll(&request)).await {
        Ok(Ok(created)) => {
            info!(
                "Created poll {} ({} options, view {})",
                created.id,
                request.options.len(),
                request.view.as_str()
            );
            Ok(created)
        }
        Ok(Err(e)) => {
            error!("Store rejected poll '{}': {}", request.title, e);
            Err(e.into())
        }
        Err(_) => {
            error!("Store timed out creating poll '{}'", request.title);
            Err(StoreError::Timeout(timeout).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{EventDetails, OptionInput, PollOptionsSelection, UserDetails};

    fn complete_state() -> WizardState {
        WizardState {
            current_step: 2,
            event_details: Some(EventDetails {
                title: " Lunch ".to_string(),
                location: Some("  ".to_string()),
                description: Some("Catch-up".to_string()),
            }),
            options: Some(PollOptionsSelection {
                options: vec![OptionInput::date("2024-01-10")],
                ..Default::default()
            }),
            user_details: Some(UserDetails {
                name: "Alice".to_string(),
                contact: "a@x.com".to_string(),
            }),
        }
    }

    #[test]
    fn builds_guest_request() {
        let request = build_request(&complete_state(), &Actor::Guest).unwrap();
        assert_eq!(request.title, "Lunch");
        assert_eq!(request.location, None);
        assert_eq!(request.description.as_deref(), Some("Catch-up"));
        assert_eq!(request.options.len(), 1);
        assert_eq!(request.options[0].duration, 0);
        assert_eq!(
            request.user(),
            Some(&UserContact {
                name: "Alice".to_string(),
                email: "a@x.com".to_string()
            })
        );
    }

    #[test]
    fn authenticated_actor_ignores_contact_step() {
        let mut state = complete_state();
        state.user_details = None;
        let actor = Actor::Authenticated {
            id: "u1".to_string(),
            name: "Alice".to_string(),
        };
        let request = build_request(&state, &actor).unwrap();
        assert_eq!(request.user(), None);
        assert_eq!(
            request.creator,
            Creator::User {
                id: "u1".to_string(),
                name: "Alice".to_string()
            }
        );
    }

    #[test]
    fn contact_left_over_from_before_sign_in_is_dropped() {
        let actor = Actor::Authenticated {
            id: "u1".to_string(),
            name: "Ann".to_string(),
        };
        let request = build_request(&complete_state(), &actor).unwrap();
        assert_eq!(request.user(), None);
        assert_eq!(
            request.creator,
            Creator::User {
                id: "u1".to_string(),
                name: "Ann".to_string()
            }
        );
    }

    #[test]
    fn reports_each_missing_field() {
        let mut state = complete_state();
        state.event_details = None;
        assert!(matches!(build_request(&state, &Actor::Guest), Err(Error::MissingField("title"))));

        let mut state = complete_state();
        state.options.as_mut().unwrap().options.clear();
        assert!(matches!(build_request(&state, &Actor::Guest), Err(Error::MissingField("options"))));

        let mut state = complete_state();
        state.user_details = None;
        assert!(matches!(build_request(&state, &Actor::Guest), Err(Error::MissingField("name"))));

        let mut state = complete_state();
        state.user_details.as_mut().unwrap().contact = String::new();
        assert!(matches!(build_request(&state, &Actor::Guest), Err(Error::MissingField("contact"))));
    }

    #[tokio::test]
    async fn empty_title_never_reaches_the_store() {
        let store = MemoryStore::new();
        let mut state = complete_state();
        state.event_details.as_mut().unwrap().title = String::new();

        let result = submit_poll(&store, &state, &Actor::Guest, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::MissingField("title"))));
        assert!(store.created_polls().is_empty());
    }

    #[tokio::test]
    async fn forwards_to_the_store() {
        let store = MemoryStore::new();
        let created = submit_poll(&store, &complete_state(), &Actor::Guest, Duration::from_secs(1))
            .await
            .unwrap();
        let stored = store.created_polls();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, created.id);
        assert_eq!(stored[0].1.title, "Lunch");
    }
}
