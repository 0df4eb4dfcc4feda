pub mod attempt;
pub mod init;
pub mod parse;
