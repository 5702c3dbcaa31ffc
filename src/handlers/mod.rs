pub mod vote;

pub use vote::{poll_results, submit_ballot};
