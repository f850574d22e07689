/// Unit normalization for kubectl table values
use crate::table::Cell;

/// Minutes per age unit suffix as kubectl prints elapsed time.
fn age_unit_minutes(unit: char) -> Option<f64> {
    match unit {
        's' => Some(1.0 / 60.0),
        'm' => Some(1.0),
        'h' => Some(60.0),
        'd' => Some(60.0 * 24.0),
        _ => None,
    }
}

/// Convert an age like "2h" or "90s" into minutes.
///
/// Anything that is not `<number><unit>` with a known unit passes through
/// unchanged as text.
pub fn age_to_minutes(raw: &str) -> Cell {
    let parsed = raw.char_indices().next_back().and_then(|(idx, unit)| {
        let factor = age_unit_minutes(unit)?;
        let number: f64 = raw[..idx].parse().ok()?;
        Some(number * factor)
    });

    match parsed {
        Some(minutes) => Cell::Float(minutes),
        None => Cell::text(raw),
    }
}

/// Parse a millicore reading like "250m" into its integer count.
///
/// kubectl top reports cpu in millicores; the trailing unit character is
/// stripped and the remainder must be an integer. Values without an integer
/// remainder (e.g. plain-core readings) are rejected.
pub fn cpu_millicores(raw: &str) -> Option<i64> {
    let (idx, _) = raw.char_indices().next_back()?;
    raw[..idx].parse().ok()
}

/// Scale a memory reading: `<n>Mi` becomes `n / 1000`, everything else is
/// kept verbatim.
///
/// The divisor is 1000, not 1024*1024. The scaling is deliberately crude,
/// matching what interactive use of the tool has always shown.
pub fn memory_scaled(raw: &str) -> Option<Cell> {
    match raw.strip_suffix("Mi") {
        Some(digits) => digits
            .parse::<i64>()
            .ok()
            .map(|mib| Cell::Float(mib as f64 / 1000.0)),
        None => Some(Cell::text(raw)),
    }
}
