pub mod comments;
pub mod complaints;
