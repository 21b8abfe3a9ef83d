use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::bail;
use anyhow::Context;

use sweep_bench_runner::prelude::SweepBenchResult;

/// Environment variable to override the root of the simulator checkout.
pub const NETSIM_ROOT_ENV: &str = "NETSIM_ROOT";

/// Environment variable naming the virtual environment the simulator must run in.
pub const NETSIM_VENV_ENV: &str = "NETSIM_VENV";

/// Resolved execution environment for the external simulator.
///
/// Resolution happens once, before any job runs. A declared virtual environment that does not
/// exist fails the sweep at startup rather than on the first job.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorEnv {
    interpreter: PathBuf,
    source_root: PathBuf,
}

impl SimulatorEnv {
    /// Resolve the simulator environment from the process environment.
    ///
    /// The simulator root comes from [`NETSIM_ROOT_ENV`], defaulting to the current directory;
    /// the module search path exported to child processes is `<root>/src`. If [`NETSIM_VENV_ENV`]
    /// declares a virtual environment then its `bin/python` is used as the interpreter, otherwise
    /// `python3` is looked up in the user's PATH.
    pub fn resolve() -> SweepBenchResult<Self> {
        let root = match env::var(NETSIM_ROOT_ENV).ok().as_deref() {
            Some("") => {
                bail!("'{NETSIM_ROOT_ENV}' set to empty string");
            }
            Some(path) => PathBuf::from(path),
            None => env::current_dir().context("Failed to read the current directory")?,
        };

        let venv = env::var(NETSIM_VENV_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self::resolve_from(root, venv)
    }

    /// Resolve against an explicit simulator root and optional virtual environment.
    pub fn resolve_from(root: PathBuf, venv: Option<PathBuf>) -> SweepBenchResult<Self> {
        let source_root = root.join("src");
        if !source_root.is_dir() {
            bail!(
                "Simulator source root not found at {}",
                source_root.display()
            );
        }

        let interpreter = match venv {
            Some(venv) => {
                let interpreter = venv.join("bin").join("python");
                if !interpreter.exists() {
                    bail!(
                        "Virtual environment declared at {venv} but no interpreter found at {interpreter}. Create the environment before starting a sweep.",
                        venv = venv.display(),
                        interpreter = interpreter.display()
                    );
                }
                interpreter
            }
            None => {
                log::warn!(
                    "No virtual environment declared so looking for 'python3' in the user's PATH"
                );
                which::which("python3").with_context(|| {
                    format!(
                        "Python interpreter not found in PATH. Install Python or set '{NETSIM_VENV_ENV}' to a virtual environment."
                    )
                })?
            }
        };

        Ok(Self {
            interpreter,
            source_root,
        })
    }

    /// The interpreter every job is started with.
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// The directory the simulator package is resolved from.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The `PYTHONPATH` value for a child process: the source root, prepended to any value
    /// already set for the orchestrator itself.
    pub fn python_path(&self) -> OsString {
        match env::var_os("PYTHONPATH") {
            Some(existing) if !existing.is_empty() => {
                let mut joined = self.source_root.as_os_str().to_os_string();
                joined.push(":");
                joined.push(existing);
                joined
            }
            _ => self.source_root.as_os_str().to_os_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn simulator_checkout() -> TempDir {
        let root = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir(root.path().join("src")).expect("failed to create source root");
        root
    }

    #[test]
    fn fails_without_a_source_root() {
        let root = TempDir::new().expect("failed to create temp dir");

        let result = SimulatorEnv::resolve_from(root.path().into(), None);

        assert!(result.is_err());
    }

    #[test]
    fn fails_when_the_declared_venv_is_absent() {
        let root = simulator_checkout();

        let result =
            SimulatorEnv::resolve_from(root.path().into(), Some(root.path().join("venv")));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Virtual environment declared"), "{err}");
    }

    #[test]
    fn uses_the_declared_venv_interpreter() {
        let root = simulator_checkout();
        let venv = root.path().join("venv");
        std::fs::create_dir_all(venv.join("bin")).unwrap();
        std::fs::write(venv.join("bin").join("python"), "").unwrap();

        let env = SimulatorEnv::resolve_from(root.path().into(), Some(venv.clone())).unwrap();

        assert_eq!(venv.join("bin").join("python"), env.interpreter());
        assert_eq!(root.path().join("src"), env.source_root());
    }

    #[test]
    fn python_path_prepends_the_source_root() {
        let root = simulator_checkout();
        let venv = root.path().join("venv");
        std::fs::create_dir_all(venv.join("bin")).unwrap();
        std::fs::write(venv.join("bin").join("python"), "").unwrap();

        let env = SimulatorEnv::resolve_from(root.path().into(), Some(venv)).unwrap();

        std::env::set_var("PYTHONPATH", "/opt/elsewhere");
        let python_path = env.python_path();
        std::env::remove_var("PYTHONPATH");

        assert_eq!(
            format!("{}:/opt/elsewhere", root.path().join("src").display()),
            python_path.to_string_lossy()
        );
    }
}
