//! Builds small SCID databases in memory, in both file generations.
#![allow(dead_code)]

use std::collections::HashMap;

pub const E2E4: u8 = 0xCF;
pub const E7E5: u8 = 0xCF;
pub const G1F3: u8 = 0x67;
pub const B8C6: u8 = 0x22;
pub const D2D4: u8 = 0xBF;
pub const VAR_START: u8 = 0x0D;
pub const VAR_END: u8 = 0x0E;
pub const END: u8 = 0x0F;

pub fn date(year: u32, month: u32, day: u32) -> u32 {
    (year << 9) | (month << 5) | day
}

pub fn eco(letter: char, number: u16, sub: u16) -> u16 {
    ((letter as u16 - 'A' as u16) * 100 + number) * 4 + sub
}

/// A game record: extra tags, optional FEN start, move bytes
pub fn game_record(tags: &[(&str, &str)], fen: Option<&str>, moves: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    for (name, value) in tags {
        data.push(name.len() as u8);
        data.extend_from_slice(name.as_bytes());
        data.push(value.len() as u8);
        data.extend_from_slice(value.as_bytes());
    }
    data.push(0);
    match fen {
        Some(fen) => {
            data.push(1);
            data.extend_from_slice(fen.as_bytes());
            data.push(0);
        }
        None => data.push(0),
    }
    data.extend_from_slice(moves);
    data
}

#[derive(Debug, Clone)]
pub struct GameEntry {
    pub white: String,
    pub black: String,
    pub event: String,
    pub site: String,
    pub round: String,
    pub white_elo: u16,
    pub black_elo: u16,
    pub date: u32,
    pub event_date: u32,
    pub result: u8,
    pub eco: u16,
    pub deleted: bool,
    pub ply_count: u32,
    pub nag_count: u8,
    pub variation_count: u8,
    pub data: Vec<u8>,
}

impl GameEntry {
    pub fn new(white: &str, black: &str) -> Self {
        GameEntry {
            white: white.to_string(),
            black: black.to_string(),
            event: "Casual".to_string(),
            site: "Online".to_string(),
            round: "1".to_string(),
            white_elo: 0,
            black_elo: 0,
            date: 0,
            event_date: 0,
            result: 0,
            eco: 0,
            deleted: false,
            ply_count: 0,
            nag_count: 0,
            variation_count: 0,
            data: game_record(&[], None, &[END]),
        }
    }
}

#[derive(Default)]
struct NameTable {
    names: Vec<String>,
    ids: HashMap<String, u32>,
    frequency: Vec<u32>,
}

impl NameTable {
    fn intern(&mut self, name: &str) -> u32 {
        let id = match self.ids.get(name) {
            Some(&id) => id,
            None => {
                let id = self.names.len() as u32;
                self.names.push(name.to_string());
                self.frequency.push(0);
                self.ids.insert(name.to_string(), id);
                id
            }
        };
        self.frequency[id as usize] += 1;
        id
    }
}

struct Ids {
    white: u32,
    black: u32,
    event: u32,
    site: u32,
    round: u32,
}

/// The three files of one database
pub struct Files {
    pub index: Vec<u8>,
    pub names: Vec<u8>,
    pub games: Vec<u8>,
}

#[derive(Default)]
pub struct TestBase {
    games: Vec<GameEntry>,
    description: String,
}

impl TestBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn game(mut self, entry: GameEntry) -> Self {
        self.games.push(entry);
        self
    }

    fn tables(&self) -> ([NameTable; 4], Vec<Ids>) {
        let mut tables: [NameTable; 4] = Default::default();
        let ids = self
            .games
            .iter()
            .map(|g| Ids {
                white: tables[0].intern(&g.white),
                black: tables[0].intern(&g.black),
                event: tables[1].intern(&g.event),
                site: tables[2].intern(&g.site),
                round: tables[3].intern(&g.round),
            })
            .collect();
        (tables, ids)
    }

    fn game_file(&self) -> (Vec<u8>, Vec<(u64, u32)>) {
        let mut data = Vec::new();
        let mut ranges = Vec::new();
        for game in &self.games {
            ranges.push((data.len() as u64, game.data.len() as u32));
            data.extend_from_slice(&game.data);
        }
        (data, ranges)
    }

    pub fn scid4(&self) -> Files {
        let (tables, ids) = self.tables();
        let (games, ranges) = self.game_file();

        let mut index = Vec::new();
        index.extend_from_slice(b"Scid.si\x1a");
        index.extend_from_slice(&400u16.to_be_bytes());
        index.extend_from_slice(&0u32.to_be_bytes());
        index.extend_from_slice(&(self.games.len() as u32).to_be_bytes()[1..]);
        index.extend_from_slice(&[0, 0, 0]);
        let mut description = self.description.as_bytes().to_vec();
        description.resize(108, 0);
        index.extend_from_slice(&description);
        index.resize(182, 0);

        for ((game, id), (offset, length)) in self.games.iter().zip(&ids).zip(&ranges) {
            index.extend_from_slice(&(*offset as u32).to_be_bytes());
            index.extend_from_slice(&((*length & 0xFFFF) as u16).to_be_bytes());
            index.push(if *length & 0x10000 != 0 { 0x80 } else { 0 });
            index.extend_from_slice(&(if game.deleted { 8u16 } else { 0 }).to_be_bytes());
            index.push(((((id.white >> 16) & 0x0F) << 4) | ((id.black >> 16) & 0x0F)) as u8);
            index.extend_from_slice(&(id.white as u16).to_be_bytes());
            index.extend_from_slice(&(id.black as u16).to_be_bytes());
            index.push(((((id.event >> 16) & 7) << 5) | (((id.site >> 16) & 7) << 2) | ((id.round >> 16) & 3)) as u8);
            index.extend_from_slice(&(id.event as u16).to_be_bytes());
            index.extend_from_slice(&(id.site as u16).to_be_bytes());
            index.extend_from_slice(&(id.round as u16).to_be_bytes());
            let var_counts = ((game.result as u16) << 12) | ((game.nag_count as u16) << 8) | game.variation_count as u16;
            index.extend_from_slice(&var_counts.to_be_bytes());
            index.extend_from_slice(&game.eco.to_be_bytes());
            index.extend_from_slice(&((game.event_date << 20) | game.date).to_be_bytes());
            index.extend_from_slice(&game.white_elo.to_be_bytes());
            index.extend_from_slice(&game.black_elo.to_be_bytes());
            index.extend_from_slice(&0u32.to_be_bytes());
            index.push(game.ply_count as u8);
            index.push((((game.ply_count >> 8) & 3) << 6) as u8);
            index.extend_from_slice(&[0; 8]);
        }

        Files { index, names: sn4(&tables), games }
    }

    pub fn scid5(&self) -> Files {
        let (tables, ids) = self.tables();
        let (games, ranges) = self.game_file();

        let mut index = Vec::new();
        for ((game, id), (offset, length)) in self.games.iter().zip(&ids).zip(&ranges) {
            let words: [u32; 14] = [
                (game.ply_count << 12) | ((game.nag_count as u32) << 8) | game.variation_count as u32,
                id.white,
                id.black,
                id.event,
                id.site,
                id.round,
                ((game.black_elo as u32) << 16) | game.white_elo as u32,
                (game.event_date << 20) | game.date,
                *offset as u32,
                (*offset >> 32) as u32,
                *length,
                ((game.eco as u32) << 2) | game.result as u32,
                if game.deleted { 8 } else { 0 },
                0,
            ];
            for word in words {
                index.extend_from_slice(&word.to_le_bytes());
            }
        }

        let mut names = Vec::new();
        for (category, table) in tables.iter().enumerate() {
            for name in &table.names {
                push_varint(&mut names, ((name.len() as u64) << 3) | category as u64);
                names.extend_from_slice(name.as_bytes());
            }
        }

        Files { index, names, games }
    }
}

fn push_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Front-coded .sn4 name file, each block sorted alphabetically
fn sn4(tables: &[NameTable; 4]) -> Vec<u8> {
    let mut data = b"Scid.sn\0".to_vec();
    data.extend_from_slice(&0u32.to_be_bytes());
    for table in tables {
        data.extend_from_slice(&(table.names.len() as u32).to_be_bytes()[1..]);
    }
    let max_freq: Vec<u32> = tables.iter().map(|t| t.frequency.iter().copied().max().unwrap_or(0)).collect();
    for freq in &max_freq {
        data.extend_from_slice(&freq.to_be_bytes()[1..]);
    }

    for (table, &max) in tables.iter().zip(&max_freq) {
        let mut order: Vec<usize> = (0..table.names.len()).collect();
        order.sort_by(|&a, &b| table.names[a].cmp(&table.names[b]));

        let mut previous: &[u8] = &[];
        for (n, &id) in order.iter().enumerate() {
            let name = table.names[id].as_bytes();
            if table.names.len() >= 65536 {
                data.extend_from_slice(&(id as u32).to_be_bytes()[1..]);
            } else {
                data.extend_from_slice(&(id as u16).to_be_bytes());
            }
            let freq = table.frequency[id];
            if max >= 65536 {
                data.extend_from_slice(&freq.to_be_bytes()[1..]);
            } else if max >= 256 {
                data.extend_from_slice(&(freq as u16).to_be_bytes());
            } else {
                data.push(freq as u8);
            }
            data.push(name.len() as u8);
            let prefix = if n == 0 {
                0
            } else {
                let shared = previous.iter().zip(name).take_while(|(a, b)| a == b).count();
                data.push(shared as u8);
                shared
            };
            data.extend_from_slice(&name[prefix..]);
            previous = name;
        }
    }
    data
}
