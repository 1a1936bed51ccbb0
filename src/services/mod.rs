pub mod dispatcher;
pub mod interaction_log;
pub mod validator;

pub use dispatcher::Dispatcher;
pub use interaction_log::JsonlInteractionLog;
pub use validator::Validator;
