//! Date helper functions

use chrono::NaiveDate;

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMMM D, YYYY") // -> "January 15, 2023"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    // Midnight so time tokens in the format still have something to print
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.format(&chrono_format).to_string())
        .unwrap_or_else(|| date.to_string())
}

/// Convert Moment.js format to chrono format
///
/// Tokens are runs of the same letter; anything else (and text inside
/// `[...]`) is copied literally.
fn moment_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::with_capacity(format.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '[' {
            let close = chars[i + 1..].iter().position(|&ch| ch == ']');
            if let Some(offset) = close {
                for &literal in &chars[i + 1..i + 1 + offset] {
                    push_literal(&mut result, literal);
                }
                i += offset + 2;
                continue;
            }
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let token: String = chars[i..i + run].iter().collect();
        match chrono_spec(&token) {
            Some(spec) => result.push_str(spec),
            None => token.chars().for_each(|ch| push_literal(&mut result, ch)),
        }
        i += run;
    }

    result
}

fn chrono_spec(token: &str) -> Option<&'static str> {
    let spec = match token {
        "YYYY" => "%Y",
        "YY" => "%y",
        "MMMM" => "%B",
        "MMM" => "%b",
        "MM" => "%m",
        "M" => "%-m",
        "DDDD" => "%j",
        "DD" => "%d",
        "D" => "%-d",
        "dddd" => "%A",
        "ddd" => "%a",
        "HH" => "%H",
        "H" => "%-H",
        "hh" => "%I",
        "h" => "%-I",
        "mm" => "%M",
        "ss" => "%S",
        "A" => "%p",
        "a" => "%P",
        _ => return None,
    };
    Some(spec)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
