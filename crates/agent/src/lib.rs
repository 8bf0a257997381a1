//! The streamcall agent — streaming replies with function calling.
//!
//! Each submission follows a **Request → Stream → Dispatch** cycle:
//!
//! 1. **Receive** user text and append it to the conversation
//! 2. **Stream** the model's reply, forwarding text chunks as they arrive
//! 3. **If a function call**: dispatch it to the service registry, append
//!    the result, and loop back to step 2
//! 4. **If text only**: return it to the caller
//!
//! The loop ends when the model replies without a function call or the
//! depth limit is reached.

pub mod agent;
pub mod stream_event;

pub use agent::Agent;
pub use stream_event::AgentStreamEvent;
