mod key_result;
mod objective;

pub use key_result::KeyResultCommands;
pub use objective::ObjectiveCommands;
