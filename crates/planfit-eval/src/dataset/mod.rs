//! Conversation records from benchmark simulation logs

mod extract;
mod preparer;

pub use extract::{
    MessageCounts, count_messages, domain_from_filename, extract_executed_tools, extract_success,
    parse_tool_call,
};
pub use preparer::{SimulationPreparer, discover};
