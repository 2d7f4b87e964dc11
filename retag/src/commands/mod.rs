/// Tag promotion command handlers
pub mod retag;
