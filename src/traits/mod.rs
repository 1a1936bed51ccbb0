pub mod generator;
pub mod interaction_log;
