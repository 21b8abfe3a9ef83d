mod interrupt;
mod seed;

pub mod prelude {
    pub use crate::interrupt::{DelegatedInterruptListener, InterruptHandle, SweepInterruptedError};
    pub use crate::seed::SeedSequence;
}
