use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Dance,
    Rest,
}

/// Why an action was refused. `Display` is the message shown to the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ActionError {
    InsufficientFunds { cost: u32, available: u32 },
    Exhausted { name: String, energy: u32 },
    InternalFault { action: ActionKind },
    NoSuchBird { index: usize },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::InsufficientFunds { .. } => write!(f, "Not enough coins!"),
            ActionError::Exhausted { .. } => {
                write!(f, "Too tired to dance! Please rest your flamingo.")
            }
            ActionError::InternalFault {
                action: ActionKind::Dance,
            } => write!(f, "Something went wrong during the dance!"),
            ActionError::InternalFault {
                action: ActionKind::Rest,
            } => write!(f, "Unable to rest right now."),
            ActionError::NoSuchBird { index } => write!(f, "There is no flamingo #{}.", index + 1),
        }
    }
}

impl std::error::Error for ActionError {}

pub(crate) const SETUP_FAULT_MESSAGE: &str =
    "Unable to load game state. Starting with default values.";
pub(crate) const TERMINAL_FAULT_MESSAGE: &str =
    "There was an error setting up the game. Please restart it.";
pub(crate) const CRITICAL_FAULT_MESSAGE: &str =
    "An unexpected error occurred. Please restart the game.";
