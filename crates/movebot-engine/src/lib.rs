pub mod dates;
pub mod engine;
pub mod i18n;
pub mod intent;
pub mod language;
pub mod prefill;

pub use engine::{Effect, Engine, EngineContext, InputEvent, Reply, StepOutcome};
pub use intent::Intent;
pub use language::detect_language;
