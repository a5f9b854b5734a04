use std::fs;
use std::path::PathBuf;

use asset_board::rows::{Row, TierValues, UNKNOWN_TEAM, parse_rows};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_fixture_and_drops_short_and_blank_lines() {
    let rows = parse_rows(&read_fixture("data.csv"));
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|row| row.player != "Dave"));
    let ranks: Vec<u32> = rows.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn team_comes_from_parenthetical_when_field_is_empty() {
    let raw = "name,team,common,uncommon,rare,epic,legendary,mystic,iconic\n\"Alice (Red Team)\",,1200,300,50,10,2,0,0\n";
    let rows = parse_rows(raw);
    assert_eq!(
        rows,
        vec![Row {
            rank: 1,
            player: "Alice (Red Team)".to_string(),
            team: "Red Team".to_string(),
            values: TierValues {
                common: 1200,
                uncommon: 300,
                rare: 50,
                epic: 10,
                legendary: 2,
                mystic: 0,
                iconic: 0,
            },
        }]
    );
}

#[test]
fn team_field_wins_and_unknown_is_the_fallback() {
    let rows = parse_rows(&read_fixture("data.csv"));
    let bob = rows.iter().find(|row| row.player == "Bob").expect("bob row");
    assert_eq!(bob.team, "Blue Team");
    let frank = rows.iter().find(|row| row.player == "Frank").expect("frank row");
    assert_eq!(frank.team, UNKNOWN_TEAM);
}

#[test]
fn invalid_values_become_zero() {
    let rows = parse_rows(&read_fixture("data.csv"));
    let carol = rows
        .iter()
        .find(|row| row.player.starts_with("carol"))
        .expect("carol row");
    assert_eq!(carol.values.common, 0);
    assert_eq!(carol.values.uncommon, 20);
    assert_eq!(carol.values.rare, 0);
    assert_eq!(carol.values.iconic, 1);
    let bob = rows.iter().find(|row| row.player == "Bob").expect("bob row");
    assert_eq!(bob.values.common, 900);
}

#[test]
fn five_field_line_is_dropped_not_defaulted() {
    let raw = "h\nShort,Team,1,2,3\nLong,Team,1,2,3,4,5,6,7\n";
    let rows = parse_rows(raw);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].player, "Long");
    assert_eq!(rows[0].rank, 1);
}

#[test]
fn header_only_and_empty_input_yield_nothing() {
    assert!(parse_rows("").is_empty());
    assert!(parse_rows("name,team,c,u,r,e,l,m,i").is_empty());
    assert!(parse_rows("name,team,c,u,r,e,l,m,i\n\n   \n").is_empty());
}

#[test]
fn extra_fields_are_ignored() {
    let raw = "h\nZoe,Teal,1,2,3,4,5,6,7,999,extra\n";
    let rows = parse_rows(raw);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values.iconic, 7);
}

#[test]
fn quoted_thousands_split_into_two_fields() {
    let raw = "h\nBob,Blue,\"1,200\",300,50,10,2,0,0\n";
    let rows = parse_rows(raw);
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].values,
        TierValues {
            common: 1,
            uncommon: 200,
            rare: 300,
            epic: 50,
            legendary: 10,
            mystic: 2,
            iconic: 0,
        }
    );
}
