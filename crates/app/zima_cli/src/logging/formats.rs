//! Log line formats.

use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// Compact format for interactive use: info lines are printed bare, other
/// levels get a colored `level:` prefix.
pub fn cli_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    match record.level() {
        Level::Info => write!(w, "{}", record.args()),
        level => {
            let prefix = format!("{}:", level.as_str().to_ascii_lowercase());
            write!(w, "{} {}", style(level).paint(prefix), record.args())
        }
    }
}
