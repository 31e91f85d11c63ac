use std::io::Write;
use std::process::Command;

use serde_json::Value;
use tempfile::NamedTempFile;

const VENUE: &str = r#"{
    "floors": [
        {
            "floor": 0,
            "rooms": [{ "id": "Lobby", "anchor": [0, 0] }],
            "doors": [
                { "id": "Lobby_1", "p1": [0, -1], "p2": [0, 1] },
                { "id": "Stairs.1.-1", "p1": [40, 0], "p2": [40, 2] }
            ],
            "segments": [{ "p1": [0, 0], "p2": [40, 0] }]
        },
        {
            "floor": -1,
            "rooms": [{ "id": "Vault", "anchor": [0, 30] }],
            "doors": [
                { "id": "Vault_1", "p1": [0, 29], "p2": [0, 31] },
                { "id": "Stairs.1.0", "p1": [0, 0], "p2": [2, 0] }
            ],
            "segments": [{ "p1": [0, 0], "p2": [0, 30] }]
        }
    ],
    "portals": [
        { "id": "Stairs.1.-1", "floor": 0, "status": "On" },
        { "id": "Stairs.1.0", "floor": -1, "status": "On" }
    ]
}"#;

fn venue_file() -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(VENUE.as_bytes()).unwrap();
    f
}

fn floorpath(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_floorpath")).args(args).output().unwrap()
}

#[test]
fn summary_lists_floors() {
    let f = venue_file();
    let out = floorpath(&["summary", "--venue", f.path().to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["floors"].as_array().unwrap().len(), 2);
    assert!(v["unmatched"].as_array().unwrap().is_empty());
}

#[test]
fn route_crosses_floors() {
    let f = venue_file();
    let out = floorpath(&["route", "--venue", f.path().to_str().unwrap(), "--from", "0:Lobby", "--to", "-1:Vault"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["degraded"], false);
    let kinds: Vec<_> = v["legs"].as_array().unwrap().iter().map(|l| l["kind"].as_str().unwrap().to_string()).collect();
    assert_eq!(kinds, ["route-to-portal", "portal-transition", "route-from-portal"]);
    assert_eq!(v["legs"][1]["instruction"], "Take Stairs 1 from floor 0 to floor -1");
}

#[test]
fn unknown_room_fails() {
    let f = venue_file();
    let out = floorpath(&["route", "--venue", f.path().to_str().unwrap(), "--from", "0:Lobby", "--to", "-1:Nowhere"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown room Nowhere"));
}

#[test]
fn malformed_room_ref_is_rejected_by_the_parser() {
    let f = venue_file();
    let out = floorpath(&["route", "--venue", f.path().to_str().unwrap(), "--from", "Lobby", "--to", "-1:Vault"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("FLOOR:ROOM"));
}
