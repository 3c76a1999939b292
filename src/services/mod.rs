pub mod reporter;

pub use reporter::{format_summary, log_summary, to_json};
