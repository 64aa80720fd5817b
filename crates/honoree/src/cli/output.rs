//! Global output flags, set once by `main` from the command line.

pub const QUIET_ENV: &str = "HONOREE_QUIET";
pub const VERBOSE_ENV: &str = "HONOREE_VERBOSE";

/// Whether `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var_os(QUIET_ENV).is_some()
}

/// Whether `--verbose` was passed.
pub fn is_verbose() -> bool {
    std::env::var_os(VERBOSE_ENV).is_some()
}

/// Default log directive for the chosen verbosity.
pub fn log_directive() -> &'static str {
    if is_verbose() {
        "honoree=debug"
    } else if is_quiet() {
        "honoree=warn"
    } else {
        "honoree=info"
    }
}

/// Print a status line to stderr unless `--quiet`.
pub fn status(message: &str) {
    if !is_quiet() {
        eprintln!("{message}");
    }
}
