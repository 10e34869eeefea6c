// Colorized wrappers for logging

use fern::Dispatch;

#[inline(always)]
pub(crate) fn format_log(message: &str) -> String {
    let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S").to_string();
    format!("[{now}] {message}")
}

macro_rules! print_error {
    ($($arg:tt)*) => {{
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::error!("{}", colored::Colorize::bright_red(message.as_str()));
    }};
}

macro_rules! print_info {
    ($($arg:tt)*) => {{
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::info!("{message}");
    }};
}

macro_rules! print_debug {
    ($($arg:tt)*) => {{
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::debug!("{}", colored::Colorize::dimmed(message.as_str()));
    }};
}

macro_rules! print_warning {
    ($($arg:tt)*) => {{
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::warn!("{}", colored::Colorize::bright_yellow(message.as_str()));
    }};
}

/// Install a stdout logger for the engine.
///
/// Only records from this crate pass below `Warn`. Fails if another logger
/// is already installed.
pub fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    Dispatch::new()
        .level(log::LevelFilter::Warn)
        .level_for("joystick", log_level)
        .chain(std::io::stdout())
        .apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_log_prefixes_timestamp() {
        let line = format_log("device added");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] device added"));
    }

    #[test]
    fn setup_installs_logger_once() {
        // Other tests in this binary never install a logger.
        let first = setup(true, true);
        assert!(first.is_ok());
        print_debug!("logger installed");
        assert!(setup(false, true).is_err());
    }
}
