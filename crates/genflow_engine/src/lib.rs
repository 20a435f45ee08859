//! Genflow engine: transport negotiation, remote operations and effect execution.
mod channel;
mod engine;
mod runner;
mod service;
mod timer;
mod transport;
mod types;
pub mod wire;

pub use channel::{Channel, ChannelSettings, ReqwestChannel, Route};
pub use engine::EngineHandle;
pub use runner::{is_presentation, EffectRunner, MsgSink};
pub use service::{NegotiatedService, RemoteService};
pub use timer::PollTimer;
pub use transport::{normalize, Negotiator};
pub use types::{ChannelError, RemoteOp, TransportCause, TransportError};
