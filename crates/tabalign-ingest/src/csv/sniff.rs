//! Delimiter detection from a content sample.

/// Delimiters considered, in order of preference on ties.
pub const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// Bytes of leading lines inspected when sniffing.
pub const SNIFF_SAMPLE_BYTES: usize = 1024;

/// Occurrences of `delimiter` outside double-quoted sections.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Picks the delimiter of a CSV sample whose first line is the header.
///
/// A candidate that occurs the same non-zero number of times on every sampled
/// line wins, the larger count first. Otherwise the candidate occurring most
/// often in the header line is used, and comma when none occurs at all.
pub fn sniff_delimiter(lines: &[String]) -> u8 {
    let lines: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect();
    let Some(header) = lines.first() else {
        return b',';
    };

    let mut consistent: Option<(u8, usize)> = None;
    for delimiter in DELIMITER_CANDIDATES {
        let expected = count_unquoted(header, delimiter);
        if expected == 0 {
            continue;
        }
        let stable = lines
            .iter()
            .all(|line| count_unquoted(line, delimiter) == expected);
        if stable && consistent.is_none_or(|(_, best)| expected > best) {
            consistent = Some((delimiter, expected));
        }
    }
    if let Some((delimiter, _)) = consistent {
        return delimiter;
    }

    let mut best = (b',', 0);
    for delimiter in DELIMITER_CANDIDATES {
        let count = count_unquoted(header, delimiter);
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}
