pub mod builder;
pub mod progress;
pub mod random;
pub mod state;
pub mod stepper;

pub use builder::{CompiledSystem, SystemBuilder};
pub use progress::{
    CancellationToken, ChannelStepObserver, ConsoleStepObserver, StepMessage, StepObserver,
};
pub use random::{sample_key, stochastic_sample};
pub use state::GenerationState;
pub use stepper::LSystem;
