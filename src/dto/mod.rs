pub mod comments;
pub mod flash;
