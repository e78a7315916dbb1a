use std::fmt;

use log::warn;

use super::error::FormatError;
use super::index::Generation;
use super::{si4, si5};

/// Placeholder returned for any name ID the dictionary does not hold
pub const UNKNOWN_NAME: &str = "?";

/// The four name tables, in the order both name files store them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCategory {
    Player,
    Event,
    Site,
    Round,
}

impl NameCategory {
    pub const ALL: [NameCategory; 4] = [NameCategory::Player, NameCategory::Event, NameCategory::Site, NameCategory::Round];

    pub fn index(self) -> usize {
        match self {
            NameCategory::Player => 0,
            NameCategory::Event => 1,
            NameCategory::Site => 2,
            NameCategory::Round => 3,
        }
    }

    pub fn from_index(index: u64) -> Option<NameCategory> {
        NameCategory::ALL.get(usize::try_from(index).ok()?).copied()
    }
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NameCategory::Player => "player",
            NameCategory::Event => "event",
            NameCategory::Site => "site",
            NameCategory::Round => "round",
        };
        write!(f, "{}", name)
    }
}

/// Player, event, site and round names, each table indexed densely by name ID.
///
/// Lookups never fail: an ID with no stored name resolves to [`UNKNOWN_NAME`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDictionary {
    tables: [Vec<Option<String>>; 4],
}

impl NameDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an in-memory name file of the given generation
    pub fn parse(data: &[u8], generation: Generation) -> Result<Self, FormatError> {
        match generation {
            Generation::Scid4 => si4::read_names(data),
            Generation::Scid5 => si5::read_names(data),
        }
    }

    /// Store `name` under `id`, growing the table as needed
    pub fn insert(&mut self, category: NameCategory, id: u32, name: String) {
        let table = &mut self.tables[category.index()];
        let slot = id as usize;
        if slot >= table.len() {
            table.resize(slot + 1, None);
        }
        if table[slot].is_some() {
            warn!("duplicate {} name ID {}; keeping the later entry", category, id);
        }
        table[slot] = Some(name);
    }

    /// Append `name` with the next free ID of its category, returning that ID
    pub fn push(&mut self, category: NameCategory, name: String) -> u32 {
        let table = &mut self.tables[category.index()];
        table.push(Some(name));
        (table.len() - 1) as u32
    }

    pub fn get(&self, category: NameCategory, id: u32) -> Option<&str> {
        self.tables[category.index()]
            .get(id as usize)
            .and_then(|name| name.as_deref())
    }

    pub fn name(&self, category: NameCategory, id: u32) -> &str {
        self.get(category, id).unwrap_or(UNKNOWN_NAME)
    }

    /// Highest ID plus one for this category
    pub fn count(&self, category: NameCategory) -> usize {
        self.tables[category.index()].len()
    }

    pub fn player(&self, id: u32) -> &str {
        self.name(NameCategory::Player, id)
    }

    pub fn event(&self, id: u32) -> &str {
        self.name(NameCategory::Event, id)
    }

    pub fn site(&self, id: u32) -> &str {
        self.name(NameCategory::Site, id)
    }

    pub fn round(&self, id: u32) -> &str {
        self.name(NameCategory::Round, id)
    }
}
