use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("State not registered: {type_name}")]
    StateNotRegistered { type_name: &'static str },
    #[error("Command not registered: {type_name}")]
    CommandNotRegistered { type_name: &'static str },
}

impl StateError {
    pub fn state_not_registered(type_name: &'static str) -> Self {
        Self::StateNotRegistered { type_name }
    }

    pub fn command_not_registered(type_name: &'static str) -> Self {
        Self::CommandNotRegistered { type_name }
    }
}
