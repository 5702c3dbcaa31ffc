//! The poll creation wizard.
//!
//! A session walks an actor through a fixed list of steps. The list is picked
//! once from the actor kind; after that the wizard is nothing more than an
//! index into it. Data entered for a step is kept when navigating back, and
//! the last step hands the assembled state to [`submit_poll`].

mod steps;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::commands::poll::submit_poll;
use crate::config::Config;
use crate::db::PollStore;
use crate::error::{Error, ValidationError};
use crate::models::{Actor, CreatedPoll, EventDetails, PollOptionsSelection, UserDetails};
pub use steps::{Step, StepData, steps_for};

/// Everything collected so far. Owned by a single session and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current_step: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_details: Option<EventDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PollOptionsSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
}

impl WizardState {
    fn record(&mut self, data: StepData) {
        match data {
            StepData::EventDetails(details) => self.event_details = Some(details),
            StepData::Options(selection) => self.options = Some(selection),
            StepData::UserDetails(user) => self.user_details = Some(user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Data recorded, moved on to `current_step`.
    Advanced { current_step: usize },
    /// The last step went through and the store accepted the poll.
    Created(CreatedPoll),
}

/// What the UI needs to draw the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub state: WizardState,
    pub steps: Vec<Step>,
    pub current: Step,
    pub is_busy: bool,
    pub created_poll_id: Option<String>,
}

#[derive(Debug)]
struct Session {
    actor: Actor,
    steps: &'static [Step],
    state: WizardState,
    created: Option<CreatedPoll>,
}

impl Session {
    fn current(&self) -> Step {
        self.steps[self.state.current_step]
    }

    fn is_last_step(&self) -> bool {
        self.state.current_step + 1 >= self.steps.len()
    }
}

#[derive(Debug)]
pub struct CreatePollWizard {
    session: Mutex<Session>,
    // Held for the whole of a submission, and for good once a poll exists.
    busy: AtomicBool,
    store_timeout: Duration,
}

impl CreatePollWizard {
    pub fn new(actor: Actor, store_timeout: Duration) -> Self {
        let steps = steps_for(&actor);
        Self {
            session: Mutex::new(Session {
                actor,
                steps,
                state: WizardState::default(),
                created: None,
            }),
            busy: AtomicBool::new(false),
            store_timeout,
        }
    }

    pub fn from_config(actor: Actor, config: &Config) -> Self {
        Self::new(actor, config.store_timeout)
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let session = self.lock();
        WizardSnapshot {
            state: session.state.clone(),
            steps: session.steps.to_vec(),
            current: session.current(),
            is_busy: self.is_busy(),
            created_poll_id: session.created.as_ref().map(|created| created.id.clone()),
        }
    }

    /// Validates `data` for the current step and either advances or, on the
    /// last step, creates the poll. Rejected with
    /// [`Error::DuplicateSubmission`] while another submission is running.
    pub async fn submit_step<S>(&self, store: &S, data: StepData) -> Result<StepOutcome, Error>
    where
        S: PollStore + ?Sized,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring {} submission, wizard is busy", data.step().as_str());
            return Err(Error::DuplicateSubmission);
        }

        let result = self.submit_while_busy(store, data).await;
        // A created poll keeps the wizard busy so it can't be created twice.
        if !matches!(result, Ok(StepOutcome::Created(_))) {
            self.busy.store(false, Ordering::Release);
        }
        result
    }

    async fn submit_while_busy<S>(&self, store: &S, data: StepData) -> Result<StepOutcome, Error>
    where
        S: PollStore + ?Sized,
    {
        let (assembled, actor) = {
            let mut session = self.lock();
            let expected = session.current();
            if data.step() != expected {
                return Err(ValidationError::WrongStep {
                    expected: expected.as_str(),
                    got: data.step().as_str(),
                }
                .into());
            }
            data.validate()?;

            if !session.is_last_step() {
                session.state.record(data);
                session.state.current_step += 1;
                debug!("Wizard advanced to {}", session.current().as_str());
                return Ok(StepOutcome::Advanced {
                    current_step: session.state.current_step,
                });
            }

            // The real state is only touched once the store says yes.
            let mut assembled = session.state.clone();
            assembled.record(data);
            (assembled, session.actor.clone())
        };

        let created = submit_poll(store, &assembled, &actor, self.store_timeout).await?;

        let mut session = self.lock();
        // The actor may have changed while the store was busy, so the live
        // index (already clamped by `set_actor`) wins over the copy's.
        let current_step = session.state.current_step;
        session.state = WizardState {
            current_step,
            ..assembled
        };
        session.created = Some(created.clone());
        info!("Wizard finished, poll {} created", created.id);
        Ok(StepOutcome::Created(created))
    }

    /// Steps back one step, keeping everything entered so far. Returns
    /// `false` when already on the first step or while busy.
    pub fn go_back(&self) -> bool {
        if self.is_busy() {
            return false;
        }
        let mut session = self.lock();
        if session.state.current_step == 0 {
            return false;
        }
        session.state.current_step -= 1;
        true
    }

    /// Stores in-progress input for the current step without validating it or
    /// moving on.
    pub fn change_step(&self, data: StepData) -> Result<(), Error> {
        if self.is_busy() {
            return Err(Error::DuplicateSubmission);
        }
        let mut session = self.lock();
        let expected = session.current();
        if data.step() != expected {
            return Err(ValidationError::WrongStep {
                expected: expected.as_str(),
                got: data.step().as_str(),
            }
            .into());
        }
        session.state.record(data);
        Ok(())
    }

    /// Switches the actor kind, e.g. after signing in halfway through. The step
    /// list is recomputed and the current index clamped into it.
    pub fn set_actor(&self, actor: Actor) {
        let mut session = self.lock();
        session.steps = steps_for(&actor);
        session.actor = actor;
        let last = session.steps.len() - 1;
        if session.state.current_step > last {
            session.state.current_step = last;
        }
    }
}
