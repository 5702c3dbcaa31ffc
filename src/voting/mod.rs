pub mod ranking;
pub mod tally;

use serde::Serialize;

use crate::models::PollBallots;
pub use ranking::{RankedOption, best_options, rank_options};
pub use tally::{OptionTally, tally_option, tally_options};

// Aggregated view of a poll, recomputed from scratch on every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: String,
    pub participant_count: usize,
    pub tallies: Vec<OptionTally>, // One per option, in option order
    pub ranking: Vec<RankedOption>,
    pub best_option_ids: Vec<String>,
    pub summary: String, // Human readable, one line per option
}

pub fn calculate_results(ballots: &PollBallots) -> PollResults {
    let tallies = tally_options(&ballots.options, &ballots.participants);
    let ranking = rank_options(&tallies);
    let best_option_ids = best_options(&tallies);
    let participant_count = ballots.participants.len();

    if participant_count == 0 {
        return PollResults {
            poll_id: ballots.poll_id.clone(),
            participant_count,
            tallies,
            ranking,
            best_option_ids,
            summary: "Nobody has voted in this poll yet.".to_string(),
        };
    }

    let mut summary = String::new();
    for (option, tally) in ballots.options.iter().zip(&tallies) {
        let is_best = best_option_ids.contains(&option.id);
        let line = format!(
            "{}: {} yes, {} if need be, {} no, {} no answer",
            option,
            tally.yes_count(),
            tally.if_need_be_count(),
            tally.no_count(),
            tally.no_response_count(participant_count)
        );
        // Best options are bolded, the same way winners are elsewhere
        if is_best {
            summary.push_str(&format!("**{}**", line));
        } else {
            summary.push_str(&line);
        }
        summary.push('\n');
    }
    summary.push_str(&format!("\n{} participants responded.", participant_count));

    PollResults {
        poll_id: ballots.poll_id.clone(),
        participant_count,
        tallies,
        ranking,
        best_option_ids,
        summary,
    }
}
