use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;

use crate::scid::{Database, Error, Generation};

/// The three files of one SCID database
///
/// - `<base>.si4` / `.si5`: index, one fixed-size record per game
/// - `<base>.sn4` / `.sn5`: name dictionary
/// - `<base>.sg4` / `.sg5`: game records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseFiles {
    pub generation: Generation,
    pub index: PathBuf,
    pub names: PathBuf,
    pub games: PathBuf,
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Drop a trailing SCID extension so `games.si4` and `games` name the same database
fn strip_scid_extension(path: &Path) -> (PathBuf, Option<Generation>) {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    for generation in Generation::ALL {
        let known = [generation.index_extension(), generation.name_extension(), generation.game_extension()];
        if ext.as_deref().is_some_and(|e| known.contains(&e)) {
            return (path.with_extension(""), Some(generation));
        }
    }
    (path.to_path_buf(), None)
}

impl DatabaseFiles {
    pub fn new(base: &Path, generation: Generation) -> Self {
        DatabaseFiles {
            generation,
            index: with_extension(base, generation.index_extension()),
            names: with_extension(base, generation.name_extension()),
            games: with_extension(base, generation.game_extension()),
        }
    }

    /// Find the database files for `base`.
    ///
    /// Without an explicit generation, the extension on `base` decides, then
    /// whichever index file exists (SCID 4 first).
    pub fn locate(base: &Path, generation: Option<Generation>) -> io::Result<Self> {
        let (base, from_extension) = strip_scid_extension(base);
        let generation = match generation.or(from_extension) {
            Some(generation) => generation,
            None => Generation::ALL
                .into_iter()
                .find(|g| with_extension(&base, g.index_extension()).exists())
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("No .si4 or .si5 index file found for {}", base.display()),
                    )
                })?,
        };

        let files = DatabaseFiles::new(&base, generation);
        for (kind, path) in [("Index", &files.index), ("Name", &files.names), ("Game", &files.games)] {
            if !path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} file not found: {}", kind, path.display()),
                ));
            }
        }
        debug!("using {} database at {}", generation, base.display());
        Ok(files)
    }

    /// Read and decode the index and name files
    pub fn open(&self) -> Result<Database, Error> {
        let index = fs::read(&self.index)?;
        let names = fs::read(&self.names)?;
        Ok(Database::open(&index, &names, self.generation)?)
    }

    pub fn game_file(&self) -> io::Result<GameFile<BufReader<File>>> {
        GameFile::open(&self.games)
    }
}

/// Random access to game records in a .sg4 / .sg5 file
pub struct GameFile<R> {
    reader: R,
}

impl GameFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(GameFile::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> GameFile<R> {
    pub fn new(reader: R) -> Self {
        GameFile { reader }
    }

    /// The raw bytes of one game record
    pub fn game_data(&mut self, offset: u64, length: u32) -> io::Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length as usize];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}
