// Interview flow: caller identity, per-caller session storage, orchestration
// over the generator, and the HTTP handlers exposing it.

pub mod handlers;
pub mod identity;
pub mod orchestrator;
pub mod session;
