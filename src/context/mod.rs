//! Session context: the command history.

mod history;

pub use history::History;
