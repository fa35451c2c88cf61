use nom::character::complete::{digit1, multispace0};
use nom::combinator::map_res;
use nom::sequence::preceded;
use nom::IResult;

/// Converts a `HH:MM:SS.mmm` timestamp into seconds.
///
/// Both `.` (WebVTT) and `,` (SubRip) are accepted as the fractional separator.
/// Parsing is lenient: every component is read from its leading digits, and a
/// component that has none counts as zero. A garbage timestamp therefore
/// yields `0.0` instead of an error, so a single broken cue can never stop
/// playback.
pub fn to_seconds(timestamp: &str) -> f64 {
    let normalised = timestamp.trim().replace(',', ".");
    let fields: Vec<&str> = normalised.splitn(3, ':').collect();
    let (hours, minutes, rest) = match fields.as_slice() {
        [h, m, rest] => (component(h), component(m), *rest),
        // WebVTT allows the hour field to be omitted.
        [m, rest] => (0, component(m), *rest),
        [rest] => (0, 0, *rest),
        _ => (0, 0, ""),
    };
    let (seconds, millis) = match rest.split_once('.') {
        Some((s, ms)) => (component(s), component(ms)),
        None => (component(rest), 0),
    };

    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0
}

/// Renders seconds as a SubRip timestamp (`HH:MM:SS,mmm`).
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn leading_integer(input: &str) -> IResult<&str, u64> {
    map_res(preceded(multispace0, digit1), |s: &str| s.parse::<u64>())(input)
}

fn component(input: &str) -> u64 {
    leading_integer(input).map(|(_, value)| value).unwrap_or(0)
}
