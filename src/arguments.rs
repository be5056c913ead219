/// Centralized argument handling for the bot binary
///
/// Command-line flags are stored once and queried from anywhere through small
/// helper functions, the same way debug modes are checked across modules.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAGS
// =============================================================================

/// Known `--debug-<module>` flags, in help order
pub const DEBUG_MODULES: &[&str] = &["api", "buy", "market", "sessions", "webhook", "system"];

pub fn is_debug_enabled_for(module: &str) -> bool {
    has_arg(&format!("--debug-{}", module))
}

pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Gets a list of all enabled debug modes
pub fn get_enabled_debug_modes() -> Vec<&'static str> {
    DEBUG_MODULES
        .iter()
        .copied()
        .filter(|module| is_debug_enabled_for(module))
        .collect()
}

// =============================================================================
// RUNTIME OPTIONS
// =============================================================================

/// Path passed with `--config <path>`
pub fn get_config_path() -> Option<String> {
    get_arg_value("--config")
}

/// Port override passed with `--port <n>`
///
/// Returns an error string when the value is present but not a valid port.
pub fn get_port_override() -> Result<Option<u16>, String> {
    match get_arg_value("--port") {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u16>()
            .map(Some)
            .map_err(|_| format!("Invalid --port value '{}': expected 1-65535", raw)),
    }
}

pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Displays the help menu with all available flags and their descriptions
pub fn print_help() {
    println!("Towns Token Bot - Base token leaderboards and guided buys");
    println!();
    println!("USAGE:");
    println!("    towns-token-bot [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config <path>           TOML settings file (default: ./config.toml if present)");
    println!("    --port <n>                Override the PORT environment variable");
    println!("    --verbose                 Show verbose logs for every module");
    println!("    --help, -h                Show this help message");
    println!();
    println!("DEBUG FLAGS:");
    for module in DEBUG_MODULES {
        println!("    --debug-{:<18}{} module debug mode", module, module);
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    APP_PRIVATE_DATA          Bot application credential (required)");
    println!("    JWT_SECRET                Webhook signing secret (required)");
    println!("    PORT                      HTTP port (default 5123)");
}
