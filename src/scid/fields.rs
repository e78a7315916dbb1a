//! Packed date, ECO and result fields shared by both index generations.
//!
//! ## SCID Date Encoding Format (20-bit packed field)
//! ```text
//! Bits 0-4:   Day   (0 = unknown)
//! Bits 5-8:   Month (0 = unknown)
//! Bits 9-19:  Year  (stored directly, no offset; 0 = unknown)
//! ```
//!
//! The upper 12 bits of the index "dates" word hold the event date relative
//! to the game year: day and month as above, and a 3-bit year offset in bits
//! 9-11 where the event year is `game_year + offset - 4`. An offset of 0
//! means no event date.

pub const UNKNOWN_DATE: &str = "????.??.??";

pub fn date_make(year: u32, month: u32, day: u32) -> u32 {
    (year << 9) | (month << 5) | day
}

pub fn date_get_year(date: u32) -> u32 {
    date >> 9
}

pub fn date_get_month(date: u32) -> u32 {
    (date >> 5) & 15
}

pub fn date_get_day(date: u32) -> u32 {
    date & 31
}

/// Render a packed date as `YYYY.MM.DD`, with `?` for unknown parts
pub fn date_string(date: u32) -> String {
    if date == 0 {
        return UNKNOWN_DATE.to_string();
    }
    let year = date_get_year(date);
    let month = date_get_month(date);
    let day = date_get_day(date);

    let year = if year == 0 { "????".to_string() } else { format!("{:04}", year) };
    let month = if month == 0 { "??".to_string() } else { format!("{:02}", month) };
    let day = if day == 0 { "??".to_string() } else { format!("{:02}", day) };
    format!("{}.{}.{}", year, month, day)
}

/// Expand a 12-bit relative event date against the game date.
///
/// Returns a full packed date, or `None` when no event date is stored.
pub fn event_date(game_date: u32, coded: u32) -> Option<u32> {
    let coded = coded & 0xFFF;
    if coded == 0 {
        return None;
    }
    let year_offset = date_get_year(coded) & 7;
    if year_offset == 0 {
        return None;
    }
    let year = (date_get_year(game_date) + year_offset).checked_sub(4)?;
    Some(date_make(year, date_get_month(coded), date_get_day(coded)))
}

/// Render an ECO code such as `B12` or `C42b`; empty when unset or invalid
pub fn eco_string(eco: u16) -> String {
    if eco == 0 {
        return String::new();
    }
    let letter = eco / 400;
    if letter > 4 {
        return String::new();
    }
    let digits = (eco >> 2) % 100;
    let subcode = eco % 4;

    let mut out = format!("{}{:02}", (b'A' + letter as u8) as char, digits);
    if subcode > 0 {
        out.push((b'a' + subcode as u8 - 1) as char);
    }
    out
}

/// Game result as a PGN result token
pub fn result_string(result: u8) -> &'static str {
    match result {
        1 => "1-0",     // White wins
        2 => "0-1",     // Black wins
        3 => "1/2-1/2", // Draw
        _ => "*",       // Unknown result
    }
}
