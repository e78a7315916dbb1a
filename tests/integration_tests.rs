// Integration tests for opening whole databases and reading games back,
// using SCID files built in memory by `common`.

mod common;

use std::fs;
use std::io::Cursor;

use common::*;
use scidread::scid::FormatError;
use scidread::{Database, DatabaseFiles, GameFile, Generation, Lister};

fn sample_base() -> TestBase {
    let mut first = GameEntry::new("Carlsen, Magnus", "Nakamura, Hikaru");
    first.event = "Norway Chess".to_string();
    first.site = "Stavanger NOR".to_string();
    first.round = "3".to_string();
    first.white_elo = 2830;
    first.black_elo = 2789;
    first.date = date(2024, 5, 29);
    first.event_date = (4 << 9) | (5 << 5) | 27;
    first.result = 1;
    first.eco = eco('C', 65, 0);
    first.ply_count = 4;
    first.data = game_record(&[("Annotator", "Anon")], None, &[E2E4, E7E5, G1F3, B8C6, END]);

    let mut second = GameEntry::new("Nakamura, Hikaru", "Carlsen, Magnus");
    second.event = "Norway Chess".to_string();
    second.site = "Stavanger NOR".to_string();
    second.round = "4".to_string();
    second.result = 3;
    second.date = date(2024, 5, 30);
    second.variation_count = 1;
    second.data = game_record(&[], None, &[E2E4, VAR_START, D2D4, VAR_END, E7E5, END]);

    let mut third = GameEntry::new("Ding, Liren", "Caruana, Fabiano");
    third.deleted = true;

    TestBase::new().description("Sample base").game(first).game(second).game(third)
}

fn open(files: &Files, generation: Generation) -> Database {
    Database::open(&files.index, &files.names, generation).expect("database should open")
}

#[test]
fn test_both_generations_give_same_headers() {
    let base = sample_base();
    let scid4 = open(&base.scid4(), Generation::Scid4);
    let scid5 = open(&base.scid5(), Generation::Scid5);

    assert_eq!(scid4.game_count(), 3);
    assert_eq!(scid5.game_count(), 3);
    for game in 0..3 {
        assert_eq!(scid4.header(game), scid5.header(game), "game {} differs between generations", game);
        assert_eq!(scid4.record(game), scid5.record(game));
    }

    let header = scid4.header(0);
    assert_eq!(header.white, "Carlsen, Magnus");
    assert_eq!(header.black, "Nakamura, Hikaru");
    assert_eq!(header.event, "Norway Chess");
    assert_eq!(header.site, "Stavanger NOR");
    assert_eq!(header.round, "3");
    assert_eq!(header.date, "2024.05.29");
    assert_eq!(header.event_date.as_deref(), Some("2024.05.27"));
    assert_eq!(header.eco, "C65");
    assert_eq!(header.result, "1-0");
    assert_eq!((header.white_elo, header.black_elo), (2830, 2789));
    assert_eq!(header.ply_count, 4);
    assert!(scid4.header(2).deleted);
}

#[test]
fn test_format_a_header_details() {
    let db = open(&sample_base().scid4(), Generation::Scid4);
    let header = db.index_header().expect("SCID 4 index has a header");
    assert_eq!(header.description, "Sample base");
    assert_eq!(header.game_count, 3);
    assert!(open(&sample_base().scid5(), Generation::Scid5).index_header().is_none());
}

#[test]
fn test_load_game_from_game_file() {
    for generation in Generation::ALL {
        let files = match generation {
            Generation::Scid4 => sample_base().scid4(),
            Generation::Scid5 => sample_base().scid5(),
        };
        let db = open(&files, generation);
        let mut games = GameFile::new(Cursor::new(files.games.clone()));

        let first = db.load_game(0, |offset, length| games.game_data(offset, length)).unwrap();
        let line: Vec<String> = first.moves.iter().map(|m| m.to_string()).collect();
        assert_eq!(line, ["e2e4", "e7e5", "g1f3", "b8c6"], "{} main line", generation);
        assert_eq!(first.tag("Annotator"), Some("Anon"));

        let second = db.load_game(1, |offset, length| games.game_data(offset, length)).unwrap();
        assert_eq!(second.moves.len(), 2, "variation excluded from the main line");
        assert_eq!(second.variation_count, 1);
        assert!(second.error.is_none());
    }
}

#[test]
fn test_name_id_out_of_range_resolves_unknown() {
    let files = sample_base().scid4();
    let mut index = files.index.clone();
    // White ID low word of the first record
    index[182 + 10] = 0x01;
    index[182 + 11] = 0x00;
    let db = Database::open(&index, &files.names, Generation::Scid4).unwrap();
    assert_eq!(db.record(0).unwrap().white_id, 256);
    assert_eq!(db.header(0).white, "?");
    assert_eq!(db.header(0).black, "Nakamura, Hikaru");
}

#[test]
fn test_search_pagination_is_stable() {
    let mut base = TestBase::new();
    for i in 0..8 {
        let white = if i < 5 { format!("So, Wesley {}", i) } else { "Giri, Anish".to_string() };
        base = base.game(GameEntry::new(&white, "Firouzja, Alireza"));
    }
    let db = open(&base.scid5(), Generation::Scid5);

    let all = db.search("wesley", 0, usize::MAX);
    assert_eq!(all.total, 5);
    let first = db.search("WESLEY", 0, 2);
    let second = db.search("Wesley", 2, 2);
    assert_eq!(first.total, 5);
    assert_eq!(second.total, 5);

    let first_games: Vec<usize> = first.matches.iter().map(|(g, _)| *g).collect();
    let second_games: Vec<usize> = second.matches.iter().map(|(g, _)| *g).collect();
    assert_eq!(first_games, [0, 1]);
    assert_eq!(second_games, [2, 3]);
    let mut union = first.matches.clone();
    union.extend(second.matches);
    assert_eq!(union, all.matches[..4].to_vec());
}

#[test]
fn test_bad_files_fail_to_open() {
    let files = sample_base().scid4();
    let err = Database::open(&files.index[..50], &files.names, Generation::Scid4).unwrap_err();
    assert!(matches!(err, FormatError::TruncatedHeader { file: "index", .. }));

    let err = Database::open(&files.names, &files.names, Generation::Scid4).unwrap_err();
    assert!(matches!(err, FormatError::BadMagic { file: "index", .. }));

    let err = Database::open(&files.index, &files.index, Generation::Scid4).unwrap_err();
    assert!(matches!(err, FormatError::BadMagic { file: "name", .. }));

    let scid5 = sample_base().scid5();
    let mut names = scid5.names.clone();
    names.extend_from_slice(&[(2 << 3) | 6, b'x', b'y']);
    let err = Database::open(&scid5.index, &names, Generation::Scid5).unwrap_err();
    assert!(matches!(err, FormatError::BadCategory { category: 6, .. }));
}

#[test]
fn test_listing_export() {
    let files = sample_base().scid4();
    let db = open(&files, Generation::Scid4);
    let mut games = GameFile::new(Cursor::new(files.games.clone()));

    let mut out = Vec::new();
    let exported = Lister::new().with_threads(2).export(&mut out, &db, &mut games).unwrap();
    assert_eq!(exported, 2, "deleted game is skipped");

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("[Game \"1\"]\n[Event \"Norway Chess\"]\n"));
    assert!(text.contains("[WhiteElo \"2830\"]\n"));
    assert!(text.contains("[Annotator \"Anon\"]\n"));
    assert!(text.contains("\n1. e2e4 e7e5 2. g1f3 b8c6\n1-0\n"));
    assert!(text.contains("[Game \"2\"]"));
    assert!(!text.contains("Ding, Liren"));

    let mut out = Vec::new();
    let exported = Lister::new()
        .with_deleted(true)
        .with_max_games(1)
        .export(&mut out, &db, &mut games)
        .unwrap();
    assert_eq!(exported, 1);
}

#[test]
fn test_export_continues_past_unreadable_record() {
    let files = sample_base().scid4();
    let mut index = files.index.clone();
    // First record's game offset now points past the end of the game file
    index[182..186].copy_from_slice(&0x00FF_FFFFu32.to_be_bytes());
    let db = Database::open(&index, &files.names, Generation::Scid4).unwrap();
    let mut games = GameFile::new(Cursor::new(files.games.clone()));

    let mut out = Vec::new();
    let exported = Lister::new().export(&mut out, &db, &mut games).unwrap();
    assert_eq!(exported, 2, "the unreadable game must not stop the export");

    let text = String::from_utf8(out).unwrap();
    let second = text.find("[Game \"2\"]").expect("second game listed");
    let (first_block, second_block) = text.split_at(second);
    assert!(first_block.starts_with("[Game \"1\"]"));
    assert!(!first_block.contains("1. "), "unreadable game has an empty main line");
    assert!(second_block.contains("\n1. e2e4 e7e5\n1/2-1/2\n"));
}

#[test]
fn test_listing_index_lines() {
    let db = open(&sample_base().scid5(), Generation::Scid5);
    let mut out = Vec::new();
    let count = Lister::new().with_deleted(true).write_index(&mut out, &db).unwrap();
    assert_eq!(count, 3);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "     1  Carlsen, Magnus (2830) - Nakamura, Hikaru (2789)  1-0  2024.05.29  Norway Chess"
    );
    assert!(lines[2].ends_with("[deleted]"));
}

#[test]
fn test_database_files_on_disk() {
    let dir = std::env::temp_dir().join(format!("scidread-it-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let base = dir.join("sample");
    let files = sample_base().scid4();
    fs::write(dir.join("sample.si4"), &files.index).unwrap();
    fs::write(dir.join("sample.sn4"), &files.names).unwrap();
    fs::write(dir.join("sample.sg4"), &files.games).unwrap();

    let located = DatabaseFiles::locate(&base, None).unwrap();
    assert_eq!(located.generation, Generation::Scid4);
    let db = located.open().unwrap();
    assert_eq!(db.game_count(), 3);

    let mut games = located.game_file().unwrap();
    let game = db.load_game(0, |offset, length| games.game_data(offset, length)).unwrap();
    assert_eq!(game.moves.len(), 4);

    let by_extension = DatabaseFiles::locate(&dir.join("sample.si4"), None).unwrap();
    assert_eq!(by_extension, located);
    fs::remove_dir_all(&dir).unwrap();
}
