mod netsim;
mod simulator_env;

pub mod prelude {
    pub use crate::netsim::NetsimRunner;
    pub use crate::simulator_env::{SimulatorEnv, NETSIM_ROOT_ENV, NETSIM_VENV_ENV};

    /// Re-export of the `sweep_bench_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your sweeps.
    pub use sweep_bench_runner::prelude::*;
}
