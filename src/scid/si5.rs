//! SCID 5 index (.si5) and name (.sn5) files.
//!
//! ## Index record (56 bytes, fourteen little-endian u32 words, no file header)
//! ```text
//! word  bits          field
//!  0    0-3 / 4-7 / 8-11 / 12-31   variations / comments / NAGs / ply count
//!  1-5  all           white, black, event, site, round name IDs
//!  6    0-15 / 16-31  white Elo / black Elo
//!  7    0-19 / 20-31  date / event date
//!  8    all           game offset, low 32 bits
//!  9    0-14          game offset, high 15 bits
//! 10    all           game length
//! 11    0-1 / 2-17    result / ECO
//! 12    all           flags
//! 13    all           reserved
//! ```
//!
//! ## Name file
//! A flat run of entries, each `varint(len << 3 | category)` followed by `len`
//! bytes of name. IDs are assigned in order of appearance within a category.

use log::{debug, warn};

use super::error::FormatError;
use super::index::{Generation, IndexFile, IndexRecord};
use super::names::{NameCategory, NameDictionary};
use super::utils::FieldReader;

pub const INDEX_RECORD_SIZE: usize = 56;

const WORDS_PER_RECORD: usize = INDEX_RECORD_SIZE / 4;

pub fn read_index(data: &[u8]) -> Result<IndexFile, FormatError> {
    let count = data.len() / INDEX_RECORD_SIZE;
    let trailing = data.len() % INDEX_RECORD_SIZE;
    if trailing != 0 {
        warn!("ignoring {} trailing bytes after {} index records", trailing, count);
    }

    let mut reader = FieldReader::new(data, "index");
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let mut words = [0u32; WORDS_PER_RECORD];
        for word in words.iter_mut() {
            *word = reader.u32_le()?;
        }
        records.push(decode_record(&words));
    }
    debug!("SCID 5 index: {} games", count);

    Ok(IndexFile::new(Generation::Scid5, None, records))
}

fn decode_record(w: &[u32; WORDS_PER_RECORD]) -> IndexRecord {
    IndexRecord {
        variation_count: (w[0] & 0x0F) as u8,
        comment_count: ((w[0] >> 4) & 0x0F) as u8,
        nag_count: ((w[0] >> 8) & 0x0F) as u8,
        ply_count: w[0] >> 12,
        white_id: w[1],
        black_id: w[2],
        event_id: w[3],
        site_id: w[4],
        round_id: w[5],
        white_elo: (w[6] & 0xFFFF) as u16,
        black_elo: (w[6] >> 16) as u16,
        date: w[7] & 0x000F_FFFF,
        event_date: w[7] >> 20,
        offset: w[8] as u64 | (((w[9] & 0x7FFF) as u64) << 32),
        length: w[10],
        result: (w[11] & 0x03) as u8,
        eco: ((w[11] >> 2) & 0xFFFF) as u16,
        flags: w[12],
    }
}

pub fn read_names(data: &[u8]) -> Result<NameDictionary, FormatError> {
    let mut reader = FieldReader::new(data, "name");
    let mut names = NameDictionary::new();

    while reader.remaining() > 0 {
        let offset = reader.position();
        let key = reader.varint()?;
        let category = NameCategory::from_index(key & 0x07)
            .ok_or(FormatError::BadCategory { offset, category: key & 0x07 })?;
        let len = usize::try_from(key >> 3).map_err(|_| FormatError::Truncated { file: "name", offset })?;
        let bytes = reader.bytes(len)?;
        names.push(category, String::from_utf8_lossy(&bytes).into_owned());
    }

    debug!(
        "SCID 5 names: {} players, {} events, {} sites, {} rounds",
        names.count(NameCategory::Player),
        names.count(NameCategory::Event),
        names.count(NameCategory::Site),
        names.count(NameCategory::Round)
    );
    Ok(names)
}
