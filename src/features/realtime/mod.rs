pub mod broadcaster;
pub mod events;
pub mod handlers;
pub mod routes;

pub use broadcaster::{Broadcaster, ChannelBroadcaster};
pub use events::{QueueEvent, Topic};
