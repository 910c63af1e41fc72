pub mod backend;
pub mod chat;
pub mod console;
pub mod contact;
