//! `log` output to stderr.

use log::LevelFilter;

/// A dispatcher that writes records at or above `level` to stderr.
pub fn dispatch(level: LevelFilter) -> fern::Dispatch {
    fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}: [{}] {}",
                record.level().as_str().to_lowercase(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr())
}

/// Install the stderr dispatcher as the global logger.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    dispatch(level).apply()
}
