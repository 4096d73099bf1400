//! The in-process resolver and the out-of-process decoder must agree on the
//! records compiled into this test binary.

use locid::config::DecoderConfig;
use locid::decode::LocationTable;
use locid::domain::ResolvedLocation;
use locid_common::{loc, LocationId};

fn tagged_sites() -> Vec<LocationId> {
    vec![loc!("first_site"), loc!("second_site"), loc!()]
}

#[test]
fn test_in_process_and_decoder_agree() {
    let exe = std::env::current_exe().expect("Failed to locate test binary");
    let table = LocationTable::load(&exe, &DecoderConfig::default()).expect("Failed to decode");
    assert!(table.anchor().is_some(), "LOC_ID_ANCHOR missing from test binary");

    for id in tagged_sites() {
        let internal = ResolvedLocation::from(id.resolve());
        let external = table.resolve(id.get()).expect("Failed to look up id");
        assert_eq!(internal, external, "id {id}");
    }
}

#[test]
fn test_full_decode_contains_tagged_sites() {
    let exe = std::env::current_exe().expect("Failed to locate test binary");
    let table = LocationTable::load(&exe, &DecoderConfig::default()).expect("Failed to decode");
    let report = table.report();

    for id in tagged_sites() {
        let decoded = report
            .locations
            .iter()
            .find(|decoded| decoded.id == Some(id.get()))
            .unwrap_or_else(|| panic!("id {id} not in decoded table"));
        assert!(decoded.location.file.ends_with("test_self_decode.rs"));
        assert_eq!(decoded.location, ResolvedLocation::from(id.resolve()));
    }

    let first = report
        .locations
        .iter()
        .find(|decoded| decoded.location.function == "first_site")
        .expect("first_site not decoded");
    assert_eq!(first.location.line, 10);
}

#[test]
fn test_default_function_name_is_module_path() {
    let id = loc!();
    assert_eq!(id.resolve().function, module_path!());
}
