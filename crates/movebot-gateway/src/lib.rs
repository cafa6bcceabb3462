pub mod app;
pub mod handlers;
pub mod ingress;
pub mod poller;

pub use ingress::{Ingress, IngressError, IngressReply};
