pub mod booking;
pub mod chat;
pub mod contact;

pub use booking::{Booking, BookingPage, BookingStatus, ConsoleAction, StatusFilter};
pub use chat::{ChatReply, ChatRequest, ChatStatus, ChatTurn, HistoryEntry, Role};
pub use contact::{ContactForm, ContactReceipt};
