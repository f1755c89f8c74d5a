/// Centralized argument handling for lendmetrics tools
///
/// Stores the process arguments once so the logger and the binaries can ask
/// for debug flags without threading `clap` matches through every call.
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::env;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by binaries and tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    *CMD_ARGS.lock() = args;
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    CMD_ARGS.lock().clone()
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    CMD_ARGS.lock().iter().any(|a| a == arg)
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Metric assembly debug mode
pub fn is_debug_metrics_enabled() -> bool {
    has_arg("--debug-metrics")
}

/// Adapter registry debug mode
pub fn is_debug_registry_enabled() -> bool {
    has_arg("--debug-registry")
}

/// Batch processing debug mode
pub fn is_debug_batch_enabled() -> bool {
    has_arg("--debug-batch")
}
