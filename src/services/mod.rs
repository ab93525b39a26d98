pub mod client;
pub mod id_gen;
pub mod poller;
pub mod projection;
pub mod store;
pub mod tracker;
pub mod validation;
