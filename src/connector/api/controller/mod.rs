pub mod ask_controller;
pub mod chat_controller;

pub use ask_controller::{load_history, AskController};
pub use chat_controller::ChatController;
