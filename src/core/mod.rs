pub mod client;
pub mod poller;
pub mod request;
pub mod resolver;
