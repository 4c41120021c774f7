// Adapters layer: concrete implementations of the domain ports.

pub mod cli_runtime;
pub mod dry_run;
pub mod memory;

pub use cli_runtime::CliRuntime;
pub use dry_run::DryRunExecutor;
pub use memory::InMemoryRuntime;
