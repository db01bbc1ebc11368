pub mod lottery;
pub mod token;

pub use lottery::{handle_lottery_command, LotteryCommands};
pub use token::{handle_token_command, TokenCommands};
