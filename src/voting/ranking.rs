use serde::Serialize;

use super::tally::OptionTally;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedOption {
    pub option_id: String,
    /// Participants who can make it, with or without reservations.
    pub score: usize,
    pub yes_count: usize,
    pub rank: usize,
}

/// Orders options by score, then by outright `yes` count. Ties keep option
/// order and share a rank.
pub fn rank_options(tallies: &[OptionTally]) -> Vec<RankedOption> {
    let mut ranked: Vec<RankedOption> = tallies
        .iter()
        .map(|tally| RankedOption {
            option_id: tally.option_id.clone(),
            score: tally.yes_count() + tally.if_need_be_count(),
            yes_count: tally.yes_count(),
            rank: 0,
        })
        .collect();

    // sort_by is stable, so equal keys stay in option order.
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.yes_count.cmp(&a.yes_count))
    });

    let mut previous: Option<(usize, usize)> = None;
    let mut rank = 0;
    for (position, entry) in ranked.iter_mut().enumerate() {
        let key = (entry.score, entry.yes_count);
        if previous != Some(key) {
            rank = position + 1;
            previous = Some(key);
        }
        entry.rank = rank;
    }
    ranked
}

/// Every option sharing the top rank. Empty when nobody can attend anything.
pub fn best_options(tallies: &[OptionTally]) -> Vec<String> {
    rank_options(tallies)
        .into_iter()
        .filter(|entry| entry.rank == 1 && entry.score > 0)
        .map(|entry| entry.option_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(id: &str, yes: usize, if_need_be: usize, no: usize) -> OptionTally {
        let names = |prefix: &str, n: usize| -> Vec<String> {
            (0..n).map(|i| format!("{prefix}{i}")).collect()
        };
        OptionTally {
            option_id: id.to_string(),
            yes: names("y", yes),
            if_need_be: names("m", if_need_be),
            no: names("n", no),
        }
    }

    #[test]
    fn orders_by_attendance_then_yes() {
        let tallies = vec![
            tally("a", 1, 0, 2),
            tally("b", 1, 2, 0),
            tally("c", 3, 0, 0),
        ];
        let ranked = rank_options(&tallies);
        let order: Vec<&str> = ranked.iter().map(|r| r.option_id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn ties_share_rank_and_keep_option_order() {
        let tallies = vec![tally("a", 2, 0, 0), tally("b", 0, 1, 0), tally("c", 2, 0, 1)];
        let ranked = rank_options(&tallies);
        assert_eq!(ranked[0].option_id, "a");
        assert_eq!(ranked[1].option_id, "c");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(best_options(&tallies), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn nothing_is_best_without_attendance() {
        let tallies = vec![tally("a", 0, 0, 3), tally("b", 0, 0, 0)];
        assert!(best_options(&tallies).is_empty());
        assert!(best_options(&[]).is_empty());
    }

    #[test]
    fn ranking_leaves_tallies_untouched() {
        let tallies = vec![tally("a", 0, 1, 0), tally("b", 1, 0, 0)];
        let before = tallies.clone();
        let _ = rank_options(&tallies);
        assert_eq!(tallies, before);
    }
}
