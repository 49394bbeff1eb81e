use std::{fmt::Write, fs, io::ErrorKind, path::Path, str};

use crate::{core::time_range::Period, prelude::*};

/// Read the periods saved by [`write_periods`].
///
/// Malformed lines are skipped, and a missing file means no periods.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_periods(path: &Path) -> Result<Vec<Period>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            info!("no saved periods yet");
            return Ok(Vec::new());
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to read `{}`", path.display()));
        }
    };
    let periods = parse_periods(&contents);
    info!(len = periods.len(), "loaded");
    Ok(periods)
}

fn parse_periods(contents: &[u8]) -> Vec<Period> {
    contents
        .split(|byte| *byte == b'\n')
        .filter_map(|line| match str::from_utf8(line) {
            Ok(line) => Some(line.trim()),
            Err(error) => {
                warn!("skipping the non-UTF-8 line: {error:#}");
                None
            }
        })
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<Period>() {
            Ok(period) => Some(period),
            Err(error) => {
                warn!(line, "skipping the malformed line: {error:#}");
                None
            }
        })
        .collect()
}

/// Save the periods as `HH:MM - HH:MM` lines.
#[instrument(skip_all, fields(path = %path.display(), len = periods.len()))]
pub fn write_periods(path: &Path, periods: &[Period]) -> Result {
    let mut contents = String::new();
    for period in periods {
        writeln!(contents, "{period}")?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write `{}`", path.display()))?;
    info!("saved");
    Ok(())
}
