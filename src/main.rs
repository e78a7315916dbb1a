use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn};

use scidread::listing::{self, Lister};
use scidread::logger;
use scidread::scid::NameCategory;
use scidread::{Database, DatabaseFiles, Generation};

/// Read SCID chess databases
///
/// ## Usage Examples:
/// ```bash
/// # Summary of a database (generation detected from the files present)
/// scidread bases/twic info
///
/// # First 20 games, one line each
/// scidread bases/twic list --max-games 20
///
/// # Everything about game 7
/// scidread bases/twic show 7
///
/// # Full listing on 4 threads
/// scidread --generation scid5 bases/twic export -o twic.txt --threads 4
/// ```
#[derive(Parser)]
#[command(name = "scidread")]
#[command(about = "Read SCID chess databases (.si4/.sn4/.sg4 and .si5/.sn5/.sg5)")]
#[command(version)]
struct Args {
    /// Path to the SCID database (without extension, or any of its files)
    #[arg(value_name = "DATABASE")]
    database: PathBuf,

    /// File generation (scid4 or scid5); detected when not given
    #[arg(short, long, value_name = "GEN")]
    generation: Option<Generation>,

    /// More log output: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Game count, generation and description
    Info,

    /// One summary line per game
    List {
        /// Maximum number of games to list
        #[arg(long)]
        max_games: Option<usize>,

        /// Include deleted games
        #[arg(long)]
        deleted: bool,
    },

    /// Header, extra tags and main line of one game
    Show {
        /// Game number, starting at 1
        #[arg(value_name = "GAME")]
        game: usize,
    },

    /// Case-insensitive search over players, event, site and ECO
    Search {
        #[arg(value_name = "TEXT")]
        text: String,

        /// Number of matches to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of matches to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Write every game as a text listing
    Export {
        /// Output file (defaults to the database name with a .txt extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Force overwrite existing output file
        #[arg(short, long)]
        force: bool,

        /// Maximum number of games to export
        #[arg(long)]
        max_games: Option<usize>,

        /// Include deleted games
        #[arg(long)]
        deleted: bool,

        /// Decoding threads (0 = one per CPU)
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}

fn main() {
    let args = Args::parse();
    logger::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let files = DatabaseFiles::locate(&args.database, args.generation)?;
    let database = files.open()?;
    info!("Loaded {} database with {} games", files.generation, database.game_count());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Info => print_info(&mut out, &args.database, &database)?,
        Command::List { max_games, deleted } => {
            let mut lister = Lister::new().with_deleted(deleted);
            if let Some(max) = max_games {
                lister = lister.with_max_games(max);
            }
            lister.write_index(&mut out, &database)?;
        }
        Command::Show { game } => {
            if game == 0 || game > database.game_count() {
                return Err(format!("game {} out of range (database has {} games)", game, database.game_count()).into());
            }
            let mut games = files.game_file()?;
            let parsed = database.load_game(game - 1, |offset, length| games.game_data(offset, length))?;
            if let Some(err) = &parsed.error {
                warn!("game {} decoded partially: {}", game, err);
            }
            listing::write_game(&mut out, game - 1, &database.header(game - 1), &parsed)?;
        }
        Command::Search { text, offset, limit } => {
            let page = database.search(&text, offset, limit);
            for (game, header) in &page.matches {
                writeln!(out, "{}", listing::summary_line(*game, header))?;
            }
            if page.matches.is_empty() {
                writeln!(out, "No matches ({} in total)", page.total)?;
            } else {
                writeln!(
                    out,
                    "Showing {}-{} of {} matches",
                    offset + 1,
                    offset + page.matches.len(),
                    page.total
                )?;
            }
        }
        Command::Export { output, force, max_games, deleted, threads } => {
            let output_path = output.unwrap_or_else(|| files.index.with_extension("txt"));
            if output_path.exists() && !force {
                return Err(format!(
                    "Output file '{}' already exists. Use --force to overwrite.",
                    output_path.display()
                )
                .into());
            }

            let mut lister = Lister::new().with_deleted(deleted).with_threads(threads);
            if let Some(max) = max_games {
                lister = lister.with_max_games(max);
            }
            let mut games = files.game_file()?;
            let mut writer = BufWriter::new(File::create(&output_path)?);
            let exported = lister.export(&mut writer, &database, &mut games)?;
            writeln!(out, "Exported {} games to '{}'", exported, output_path.display())?;
        }
    }
    Ok(())
}

fn print_info<W: Write>(out: &mut W, path: &Path, database: &Database) -> io::Result<()> {
    writeln!(out, "Database:    {}", path.display())?;
    writeln!(out, "Generation:  {}", database.generation())?;
    writeln!(out, "Games:       {}", database.game_count())?;
    if let Some(header) = database.index_header() {
        writeln!(out, "Version:     {}", header.version)?;
        if !header.description.is_empty() {
            writeln!(out, "Description: {}", header.description)?;
        }
        if header.auto_load > 0 {
            writeln!(out, "Auto-load:   game {}", header.auto_load)?;
        }
    }
    let deleted = (0..database.game_count())
        .filter(|&game| database.record(game).is_some_and(|r| r.is_deleted()))
        .count();
    writeln!(out, "Deleted:     {}", deleted)?;
    for category in NameCategory::ALL {
        writeln!(out, "{:<12} {}", format!("{}s:", category), database.names().count(category))?;
    }
    Ok(())
}
