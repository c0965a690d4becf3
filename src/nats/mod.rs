pub mod client;
pub mod messages;
pub mod responder;

pub use client::NatsChannel;
pub use messages::TranscriptMessage;
