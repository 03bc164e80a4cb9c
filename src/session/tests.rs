use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::*;

fn session() -> Session<Vec<u8>> {
    Session::with_builtins(Vec::new()).unwrap()
}

fn output(session: Session<Vec<u8>>) -> String {
    String::from_utf8(session.into_output()).unwrap()
}

fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_transform_between_boards() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.ucf",
        "# Papilio One\nNET CLK LOC=\"P89\";\nNET A0 LOC=\"P18\";\nNET X LOC=\"P999\";\n");

    let mut session = session();
    session.run(&[
        Step::SourceBoard("p1".into()),
        Step::DestinationBoard("Papilio RAM".into()),
        Step::Transform { input },
    ]).unwrap();

    assert_eq!(
        output(session),
        "# Papilio One\nNET CLK LOC=\"P43\";\nNET A0 LOC=\"P20\";\nNET X LOC=\"P999\";\n"
    );
}

#[test]
fn test_transform_with_moves() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.ucf", "NET A0 LOC=\"P18\";\nNET B0 LOC=\"P85\";\n");

    let mut session = session();
    session.run(&[
        Step::SourceBoard("p1".into()),
        Step::DestinationBoard("pram".into()),
        Step::Move("A->B".into()),
        Step::Move("B->A".into()),
        Step::Transform { input },
    ]).unwrap();

    assert_eq!(output(session), "NET A0 LOC=\"P46\";\nNET B0 LOC=\"P20\";\n");
}

#[test]
fn test_boards_default_to_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.ucf", "NET A0 LOC=\"P18\";\n");

    let mut session = session();
    session.run(&[
        Step::DestinationBoard("p1".into()),
        Step::Transform { input },
    ]).unwrap();

    assert_eq!(output(session), "NET A0 LOC=\"P18\";\n");
}

#[test]
fn test_generate() {
    let mut session = session();
    session.run(&[
        Step::DestinationBoard("p1".into()),
        Step::Generate { filter: "CLK,A,BL".into() },
    ]).unwrap();

    let text = output(session);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(lines[0], "NET CLK   LOC=\"P89\" | PERIOD=31.25ns; # CLK");
}

#[test]
fn test_generate_with_wings() {
    let mut session = session();
    session.set_options(GenerateOptions { collapse_columns: true, ..Default::default() });
    session.run(&[
        Step::SourceBoard("p1".into()),
        Step::PlaceWing("B/LED->AL;PS/2->BH".into()),
        Step::Generate { filter: "CLK,AL,BH".into() },
    ]).unwrap();

    let text = output(session);
    assert!(text.contains("NET LED(0)    LOC=\"P18\" | IOSTANDARD=LVTTL | DRIVE=8 | SLEW=SLOW; # A0\n"));
    assert!(text.contains("NET PS2_DATA1 LOC=\"P58\" | PULLUP; # B8\n"));
}

#[test]
fn test_placements_are_used_once() {
    let mut session = session();
    session.run(&[
        Step::SourceBoard("p1".into()),
        Step::PlaceWing("bled->AH".into()),
        Step::Generate { filter: "AH".into() },
        Step::Generate { filter: "AH".into() },
    ]).unwrap();

    let catalog = session.catalog();
    let p1 = catalog.find(BoardKind::Board, "p1").unwrap();
    let deepest = catalog.pins(p1).into_iter()
        .map(|pin| catalog.pin(pin).stack_depth())
        .max();
    assert_eq!(deepest, Some(1));

    assert_eq!(output(session).matches("NET LED(7)").count(), 2);
}

#[test]
fn test_unknown_wing() {
    let mut session = session();
    let result = session.run(&[
        Step::SourceBoard("p1".into()),
        Step::PlaceWing("nowing->A".into()),
        Step::Generate { filter: "all".into() },
    ]);

    assert!(matches!(result, Err(SessionError::UnknownWing(name)) if name == "nowing"));
    assert!(output(session).is_empty());
}

#[test]
fn test_validate() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_file(dir.path(), "good.ucf", "NET A LOC=\"P18\";\n# NET B LOC=\"P1000\";\n");
    let bad = write_file(dir.path(), "bad.ucf", "NET A LOC=\"P18\";\nNET B LOC=\"P20\";\nNET C LOC=\"P21\";\n");

    let mut session = session();
    session.run(&[
        Step::SourceBoard("p1".into()),
        Step::Validate { input: good.clone() },
    ]).unwrap();
    assert_eq!(
        output(session),
        format!("All pins in file '{}' are valid for the p1 board\n", good.display())
    );

    let mut session = self::session();
    let result = session.run(&[
        Step::SourceBoard("p1".into()),
        Step::Validate { input: bad },
    ]);
    assert!(matches!(result, Err(SessionError::InvalidPins { count: 2, .. })));
}

#[test]
fn test_list() {
    let mut session = session();
    session.run(&[Step::List(ListScope::Boards)]).unwrap();

    let text = output(session);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2 + 4);
    assert_eq!(lines[0], "Name             Type  Aliases");
    assert!(lines[1].starts_with("================ ====="));
    assert_eq!(lines[2], "Papilio One      Board p1");
    assert!(lines[5].starts_with("Papilio RAM "));

    let mut session = self::session();
    session.run(&[Step::List("all".parse().unwrap())]).unwrap();
    let text = output(session);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2 + 7);
    assert!(lines[2].starts_with("Arcade "));
}

#[test]
fn test_list_scope_parse() {
    assert_eq!("".parse::<ListScope>().unwrap(), ListScope::All);
    assert_eq!("*".parse::<ListScope>().unwrap(), ListScope::All);
    assert_eq!("Boards".parse::<ListScope>().unwrap(), ListScope::Boards);
    assert_eq!("wing".parse::<ListScope>().unwrap(), ListScope::Wings);
    assert!("pins".parse::<ListScope>().is_err());
}

#[test]
fn test_export_json() {
    let mut session = session();
    session.run(&[Step::Export { names: vec!["P1".into()], format: ExportFormat::Json }]).unwrap();

    let summaries: Vec<BoardSummary> = serde_json::from_str(&output(session)).unwrap();
    assert_eq!(summaries.len(), 1);

    let p1 = &summaries[0];
    assert_eq!(p1.names, vec!["Papilio One", "p1"]);
    assert!(!p1.wing);
    assert_eq!(
        p1.buses.iter().map(|bus| bus.name.as_str()).collect::<Vec<_>>(),
        vec!["CLK", "TX", "RX", "A", "B", "C"]
    );
    assert_eq!(p1.buses[3].pins[0].physical.as_deref(), Some("P18"));
    assert_eq!(p1.buses[3].pins[0].net.as_deref(), Some("A(0)"));
}

#[test]
fn test_export_yaml_all() {
    let mut session = session();
    session.run(&[Step::Export { names: vec![":all".into()], format: ExportFormat::Yaml }]).unwrap();

    let summaries: Vec<BoardSummary> = serde_yaml::from_str(&output(session)).unwrap();
    assert_eq!(summaries.len(), 7);
    assert_eq!(summaries.iter().filter(|summary| summary.wing).count(), 3);

    let p1_500 = summaries.iter().find(|summary| summary.names[0] == "Papilio One 500K").unwrap();
    assert_eq!(p1_500.parent.as_deref(), Some("Papilio One"));
    assert_eq!(p1_500.configs, vec![("ENABLE_SUSPEND".to_string(), Some("FILTERED".to_string()))]);
}

#[test]
fn test_load_gzipped_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extra.txt.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b"\"Tiny\", tiny : \"Papilio One\" {\n  D : P7, P8\n}\n").unwrap();
    encoder.finish().unwrap();

    let mut session = session();
    session.run(&[
        Step::LoadDefinitions { path, kind: BoardKind::Board },
        Step::DestinationBoard("tiny".into()),
        Step::Generate { filter: "CLK,D".into() },
    ]).unwrap();

    assert_eq!(
        output(session),
        "NET CLK  LOC=\"P89\" | PERIOD=31.25ns; # CLK\n\
         NET D(0) LOC=\"P7\"                    # D0\n\
         NET D(1) LOC=\"P8\"                    # D1\n"
    );
}

#[test]
fn test_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let mut session = session();
    let result = session.run(&[
        Step::DestinationBoard("p1".into()),
        Step::LoadDefinitions { path: missing, kind: BoardKind::Board },
        Step::Generate { filter: "all".into() },
    ]);

    assert!(matches!(result, Err(SessionError::Load(LoadError::CantOpenFile { .. }))));
    assert!(output(session).is_empty());
}

#[test]
fn test_board_selection_errors() {
    let mut session = session();
    assert!(matches!(
        session.run(&[Step::SourceBoard("bled".into())]),
        Err(SessionError::UnknownBoard(_))
    ));

    let mut session = self::session();
    assert!(matches!(
        session.run(&[Step::Generate { filter: "all".into() }]),
        Err(SessionError::NoBoardSelected)
    ));

    let mut session = Session::new(Vec::new());
    assert!(matches!(
        session.run(&[Step::SourceBoard("p1".into())]),
        Err(SessionError::UnknownBoard(_))
    ));
}

#[test]
fn test_bad_move_directive() {
    let mut session = session();
    assert!(matches!(
        session.run(&[Step::Move("A[0:3->B".into())]),
        Err(SessionError::BusRange(_))
    ));
}
