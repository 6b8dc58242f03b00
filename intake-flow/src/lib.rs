pub mod context;
pub mod error;
pub mod machine;
pub mod runner;
pub mod session;
pub mod step;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use machine::{ExecutionResult, MachineBuilder, WizardMachine, WizardStatus};
pub use runner::WizardRunner;
pub use session::{InMemorySessionStorage, SessionStorage, WizardSession};
pub use step::{NextAction, Step, StepResult, WizardStep};
