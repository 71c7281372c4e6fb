// Service exports
pub mod cooldown;
pub mod datasets;
pub mod llm;

pub use cooldown::{CooldownDecision, CooldownError, CooldownGate, CooldownKey, CounterStore};
pub use datasets::{find_vibe, DatasetError, DatasetService};
pub use llm::{LlmClient, LlmError, ParsedQuery};
