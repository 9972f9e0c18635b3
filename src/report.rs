use std::io::Write;

use crate::error::{Error, Result};
use crate::map::StationTable;
use crate::temperature::Reading;

/// Rounds half away from zero to one decimal and drops the sign of zero.
fn round_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Renders `{name=min/mean/max, ...}` with names in ascending byte order.
pub fn format_results<R: Reading>(results: &StationTable<R>) -> Result<String> {
    let mut names = results.names();
    names.sort_unstable();

    let mut output = String::with_capacity(names.len() * 24 + 2);
    output.push('{');
    for (index, name) in names.into_iter().enumerate() {
        if name.is_empty() {
            return Err(Error::EmptyStationName);
        }
        if index != 0 {
            output.push_str(", ");
        }
        let temperature = results.values_of(name);
        output.push_str(&format!(
            "{}={:.1}/{:.1}/{:.1}",
            String::from_utf8_lossy(name),
            round_tenth(temperature.min()),
            round_tenth(temperature.mean()),
            round_tenth(temperature.max())
        ));
    }
    output.push('}');
    Ok(output)
}

pub fn write_results<R: Reading, W: Write>(results: &StationTable<R>, sink: &mut W) -> Result<()> {
    let output = format_results(results)?;
    sink.write_all(output.as_bytes())?;
    sink.flush()?;
    Ok(())
}
