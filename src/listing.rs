use std::io::{self, Read, Seek, Write};

use log::{info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::files::GameFile;
use crate::scid::{parse_game, Database, GameHeader, ParsedGame};

/// Games read from disk before each parallel decode pass
const BATCH_SIZE: usize = 512;

/// Writes games as text: tag-style header lines, then the main line as
/// numbered square pairs (`1. e2e4 e7e5 2. g1f3 ...`).
pub struct Lister {
    max_games: Option<usize>,
    include_deleted: bool,
    threads: Option<usize>,
}

impl Lister {
    pub fn new() -> Self {
        Lister {
            max_games: None,
            include_deleted: false,
            threads: None,
        }
    }

    pub fn with_max_games(mut self, max: usize) -> Self {
        self.max_games = Some(max);
        self
    }

    pub fn with_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Decode with `threads` workers; 0 lets rayon pick
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Game numbers to output, in order
    pub fn selected_games(&self, database: &Database) -> Vec<usize> {
        let limit = self.max_games.unwrap_or(usize::MAX);
        (0..database.game_count())
            .filter(|&game| {
                self.include_deleted || !database.record(game).is_some_and(|record| record.is_deleted())
            })
            .take(limit)
            .collect()
    }

    /// One summary line per game
    pub fn write_index<W: Write>(&self, writer: &mut W, database: &Database) -> io::Result<usize> {
        let games = self.selected_games(database);
        for &game in &games {
            writeln!(writer, "{}", summary_line(game, &database.header(game)))?;
        }
        Ok(games.len())
    }

    /// Full listing of every selected game. Decoding runs on a rayon pool;
    /// output stays in game order.
    pub fn export<W: Write, R: Read + Seek>(
        &self,
        writer: &mut W,
        database: &Database,
        games: &mut GameFile<R>,
    ) -> io::Result<usize> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .build()
            .map_err(io::Error::other)?;

        let selected = self.selected_games(database);
        let mut exported = 0;
        let mut next_report = 1000;

        for batch in selected.chunks(BATCH_SIZE) {
            let mut raw = Vec::with_capacity(batch.len());
            for &game in batch {
                // An unreadable record is listed with an empty main line
                let bytes = match database.record(game) {
                    Some(record) if record.length > 0 => {
                        games.game_data(record.offset, record.length).unwrap_or_else(|err| {
                            warn!("game {}: {}", game + 1, err);
                            Vec::new()
                        })
                    }
                    _ => Vec::new(),
                };
                raw.push((game, bytes));
            }

            let decoded: Vec<(usize, ParsedGame)> = pool.install(|| {
                raw.par_iter()
                    .map(|(game, bytes)| (*game, parse_game(bytes)))
                    .collect()
            });

            for (game, parsed) in &decoded {
                if let Some(err) = &parsed.error {
                    warn!("game {}: {}", game + 1, err);
                }
                write_game(writer, *game, &database.header(*game), parsed)?;
                writeln!(writer)?;
                exported += 1;
            }

            if exported >= next_report {
                info!("Exported {} games...", exported);
                next_report += 1000;
            }
        }

        writer.flush()?;
        Ok(exported)
    }
}

impl Default for Lister {
    fn default() -> Self {
        Self::new()
    }
}

/// `   12  Carlsen, Magnus (2830) - Nakamura, Hikaru (2789)  1-0  2024.05.27  Norway Chess`
pub fn summary_line(game: usize, header: &GameHeader) -> String {
    let mut line = format!(
        "{:>6}  {} - {}  {}  {}  {}",
        game + 1,
        with_elo(&header.white, header.white_elo),
        with_elo(&header.black, header.black_elo),
        header.result,
        header.date,
        header.event
    );
    if header.deleted {
        line.push_str("  [deleted]");
    }
    line
}

fn with_elo(name: &str, elo: u16) -> String {
    if elo > 0 {
        format!("{} ({})", name, elo)
    } else {
        name.to_string()
    }
}

/// Header block, extra tags and main line of one game
pub fn write_game<W: Write>(writer: &mut W, game: usize, header: &GameHeader, parsed: &ParsedGame) -> io::Result<()> {
    write_header(writer, game, header, parsed)?;
    writeln!(writer)?;
    write_moves(writer, parsed)?;
    writeln!(writer, "{}", header.result)
}

fn write_header<W: Write>(writer: &mut W, game: usize, header: &GameHeader, parsed: &ParsedGame) -> io::Result<()> {
    writeln!(writer, "[Game \"{}\"]", game + 1)?;
    writeln!(writer, "[Event \"{}\"]", header.event)?;
    writeln!(writer, "[Site \"{}\"]", header.site)?;
    writeln!(writer, "[Date \"{}\"]", header.date)?;
    if let Some(event_date) = &header.event_date {
        writeln!(writer, "[EventDate \"{}\"]", event_date)?;
    }
    writeln!(writer, "[Round \"{}\"]", header.round)?;
    writeln!(writer, "[White \"{}\"]", header.white)?;
    writeln!(writer, "[Black \"{}\"]", header.black)?;
    writeln!(writer, "[Result \"{}\"]", header.result)?;

    if header.white_elo > 0 {
        writeln!(writer, "[WhiteElo \"{}\"]", header.white_elo)?;
    }
    if header.black_elo > 0 {
        writeln!(writer, "[BlackElo \"{}\"]", header.black_elo)?;
    }
    if !header.eco.is_empty() {
        writeln!(writer, "[ECO \"{}\"]", header.eco)?;
    }
    if let Some(fen) = &parsed.start_fen {
        writeln!(writer, "[SetUp \"1\"]")?;
        writeln!(writer, "[FEN \"{}\"]", fen)?;
    }
    for (name, value) in &parsed.tags {
        writeln!(writer, "[{} \"{}\"]", name, value.replace('\\', "\\\\").replace('"', "\\\""))?;
    }
    Ok(())
}

fn write_moves<W: Write>(writer: &mut W, parsed: &ParsedGame) -> io::Result<()> {
    if parsed.moves.is_empty() {
        return Ok(());
    }
    // Black moves first from a custom position with black to play
    let black_first = parsed.start_fen.as_deref().is_some_and(|fen| fen.split_whitespace().nth(1) == Some("b"));
    let offset = usize::from(black_first);

    let mut line = String::new();
    for (i, mv) in parsed.moves.iter().enumerate() {
        let ply = i + offset;
        if ply % 2 == 0 {
            line.push_str(&format!("{}. ", ply / 2 + 1));
        } else if i == 0 {
            line.push_str(&format!("{}... ", ply / 2 + 1));
        }
        line.push_str(&mv.to_string());
        line.push(' ');
        // Line break every 10 full moves
        if ply % 20 == 19 {
            writeln!(writer, "{}", line.trim_end())?;
            line.clear();
        }
    }
    if !line.is_empty() {
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}
