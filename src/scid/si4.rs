//! SCID 4 index (.si4) and name (.sn4) files.
//!
//! All multi-byte values are big-endian. Name IDs are split across a shared
//! "high" byte and a 16-bit low part, so a record packs five IDs of up to
//! 20/20/19/19/18 bits into 12 bytes.

use std::cmp;

use log::{debug, warn};

use super::error::FormatError;
use super::index::{Generation, IndexFile, IndexHeader, IndexRecord};
use super::names::{NameCategory, NameDictionary};
use super::utils::FieldReader;

pub const INDEX_MAGIC: &[u8; 7] = b"Scid.si";
pub const NAME_MAGIC: &[u8; 7] = b"Scid.sn";
pub const INDEX_HEADER_SIZE: usize = 182;
pub const INDEX_RECORD_SIZE: usize = 47;
pub const NAME_HEADER_SIZE: usize = 36;

const DESCRIPTION_SIZE: usize = 108;
const FLAG_NAME_SIZE: usize = 9;

fn check_magic(data: &[u8], magic: &[u8; 7], file: &'static str, header_size: usize) -> Result<(), FormatError> {
    if data.len() < magic.len() + 1 {
        return Err(FormatError::TruncatedHeader { file, needed: header_size, actual: data.len() });
    }
    if &data[..7] != magic {
        return Err(FormatError::BadMagic { file, found: data[..8].to_vec() });
    }
    if data.len() < header_size {
        return Err(FormatError::TruncatedHeader { file, needed: header_size, actual: data.len() });
    }
    Ok(())
}

/// Decode a complete .si4 buffer
pub fn read_index(data: &[u8]) -> Result<IndexFile, FormatError> {
    check_magic(data, INDEX_MAGIC, "index", INDEX_HEADER_SIZE)?;
    // Current SCID writes 0x1A after the magic, older files a NUL
    if data[7] != 0x1A && data[7] != 0 {
        return Err(FormatError::BadMagic { file: "index", found: data[..8].to_vec() });
    }

    let mut reader = FieldReader::new(data, "index");
    reader.set_position(8);
    let header = read_header(&mut reader)?;

    let available = (data.len() - INDEX_HEADER_SIZE) / INDEX_RECORD_SIZE;
    let count = cmp::min(header.game_count as usize, available);
    if count < header.game_count as usize {
        warn!(
            "index header declares {} games but the file only holds {} records",
            header.game_count, available
        );
    }
    debug!("SCID 4 index version {}, {} games", header.version, count);

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(read_record(&mut reader)?);
    }

    Ok(IndexFile::new(Generation::Scid4, Some(header), records))
}

fn read_header(reader: &mut FieldReader) -> Result<IndexHeader, FormatError> {
    let version = reader.u16_be()?;
    let base_type = reader.u32_be()?;
    let game_count = reader.u24_be()?;
    let auto_load = reader.u24_be()?;
    let description = reader.string(DESCRIPTION_SIZE)?;
    let mut flag_names: [String; 6] = Default::default();
    for name in flag_names.iter_mut() {
        *name = reader.string(FLAG_NAME_SIZE)?;
    }
    Ok(IndexHeader { version, base_type, game_count, auto_load, description, flag_names })
}

/// Decode one 47-byte record at the reader's position
fn read_record(reader: &mut FieldReader) -> Result<IndexRecord, FormatError> {
    let offset = reader.u32_be()?;
    let length_low = reader.u16_be()? as u32;
    let length_high = reader.u8()? as u32;
    let flags = reader.u16_be()? as u32;

    let white_black_high = reader.u8()? as u32;
    let white_low = reader.u16_be()? as u32;
    let black_low = reader.u16_be()? as u32;

    let event_site_round_high = reader.u8()? as u32;
    let event_low = reader.u16_be()? as u32;
    let site_low = reader.u16_be()? as u32;
    let round_low = reader.u16_be()? as u32;

    let var_counts = reader.u16_be()?;
    let eco = reader.u16_be()?;
    let dates = reader.u32_be()?;
    let white_elo = reader.u16_be()?;
    let black_elo = reader.u16_be()?;
    let _final_material = reader.u32_be()?;
    let ply_low = reader.u8()? as u32;
    let home_pawn = reader.bytes(9)?;

    Ok(IndexRecord {
        white_id: ((white_black_high & 0xF0) << 12) | white_low,
        black_id: ((white_black_high & 0x0F) << 16) | black_low,
        event_id: ((event_site_round_high >> 5) << 16) | event_low,
        site_id: (((event_site_round_high >> 2) & 7) << 16) | site_low,
        round_id: ((event_site_round_high & 3) << 16) | round_low,
        // Top 4 bits of each rating hold the rating type
        white_elo: white_elo & 0x0FFF,
        black_elo: black_elo & 0x0FFF,
        date: dates & 0x000F_FFFF,
        event_date: dates >> 20,
        result: (var_counts >> 12) as u8,
        eco,
        offset: offset as u64,
        length: length_low + ((length_high & 0x80) << 9),
        flags,
        ply_count: ply_low | (((home_pawn[0] >> 6) as u32) << 8),
        variation_count: (var_counts & 0x0F) as u8,
        comment_count: ((var_counts >> 4) & 0x0F) as u8,
        nag_count: ((var_counts >> 8) & 0x0F) as u8,
    })
}

/// Decode a complete .sn4 buffer.
///
/// ## Layout
/// ```text
/// header (36 bytes)
///   magic        8   "Scid.sn" + 1 byte
///   timestamp    4
///   counts       4 × 3   names per category
///   max freq     4 × 3   highest frequency per category
/// entries, player block first, then event, site, round
///   id           2, or 3 when the category holds 65536+ names
///   frequency    1 / 2 / 3 by max frequency (<256 / <65536 / else)
///   length       1   full name length
///   prefix       1   bytes shared with the previous name (not on a block's first entry)
///   suffix       length - prefix
/// ```
pub fn read_names(data: &[u8]) -> Result<NameDictionary, FormatError> {
    check_magic(data, NAME_MAGIC, "name", NAME_HEADER_SIZE)?;

    let mut reader = FieldReader::new(data, "name");
    reader.set_position(8);
    let _timestamp = reader.u32_be()?;
    let mut counts = [0u32; 4];
    for count in counts.iter_mut() {
        *count = reader.u24_be()?;
    }
    let mut max_frequency = [0u32; 4];
    for freq in max_frequency.iter_mut() {
        *freq = reader.u24_be()?;
    }

    let mut names = NameDictionary::new();
    for category in NameCategory::ALL {
        let count = counts[category.index()];
        let max_freq = max_frequency[category.index()];
        read_block(&mut reader, &mut names, category, count, max_freq)?;
        debug!("read {} {} names", count, category);
    }

    if reader.remaining() > 0 {
        debug!("{} bytes after the last name block", reader.remaining());
    }
    Ok(names)
}

fn read_block(
    reader: &mut FieldReader,
    names: &mut NameDictionary,
    category: NameCategory,
    count: u32,
    max_freq: u32,
) -> Result<(), FormatError> {
    let mut previous: Vec<u8> = Vec::new();
    for n in 0..count {
        let entry_offset = reader.position();
        let id = if count >= 65536 { reader.u24_be()? } else { reader.u16_be()? as u32 };
        let _frequency = if max_freq >= 65536 {
            reader.u24_be()?
        } else if max_freq >= 256 {
            reader.u16_be()? as u32
        } else {
            reader.u8()? as u32
        };
        let length = reader.u8()? as usize;
        let prefix = if n == 0 { 0 } else { reader.u8()? as usize };
        if prefix > length || prefix > previous.len() {
            return Err(FormatError::BadPrefix { offset: entry_offset, prefix, length });
        }

        let mut name = previous[..prefix].to_vec();
        name.extend(reader.bytes(length - prefix)?);

        if id < count {
            names.insert(category, id, String::from_utf8_lossy(&name).into_owned());
        } else {
            warn!("{} name ID {} out of range (count {}); skipped", category, id, count);
        }
        previous = name;
    }
    Ok(())
}
