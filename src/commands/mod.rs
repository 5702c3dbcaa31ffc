pub mod poll;

pub use poll::{build_request, submit_poll};
