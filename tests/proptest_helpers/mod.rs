#![allow(dead_code)]

use std::fmt::Write as _;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

#[derive(Clone, Debug)]
pub struct Export {
    pub markers: Vec<(u8, f64, f64, f64)>,
    pub cameras: Vec<(u8, String)>,
    pub observations: Vec<(u8, u8, f64, f64)>,
}

pub fn arb_coord() -> impl Strategy<Value = f64> {
    -1.0e7..1.0e7f64
}

pub fn arb_export() -> impl Strategy<Value = Export> {
    (
        proptest::collection::vec((0u8..8, arb_coord(), arb_coord(), arb_coord()), 0..8),
        proptest::collection::vec(
            (
                0u8..8,
                proptest::string::string_regex("[A-Za-z0-9_]{0,8}(\\.JPG|\\.jpg)?")
                    .expect("label regex"),
            ),
            0..8,
        ),
        proptest::collection::vec((0u8..10, 0u8..10, 0.0..8000.0f64, 0.0..6000.0f64), 0..24),
    )
        .prop_map(|(markers, cameras, observations)| Export {
            markers,
            cameras,
            observations,
        })
}

pub fn to_xml(export: &Export) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document><chunk>\n");

    xml.push_str("<cameras>\n");
    for (id, label) in &export.cameras {
        writeln!(xml, "<camera id=\"{id}\" label=\"{label}\"/>").expect("write to string");
    }
    xml.push_str("</cameras>\n<markers>\n");
    for (id, x, y, z) in &export.markers {
        writeln!(
            xml,
            "<marker id=\"{id}\"><reference x=\"{x}\" y=\"{y}\" z=\"{z}\"/></marker>"
        )
        .expect("write to string");
    }
    xml.push_str("</markers>\n<frames><frame id=\"0\"><markers>\n");
    for (marker, camera, px, py) in &export.observations {
        writeln!(
            xml,
            "<marker marker_id=\"{marker}\"><location camera_id=\"{camera}\" x=\"{px}\" y=\"{py}\"/></marker>"
        )
        .expect("write to string");
    }
    xml.push_str("</markers></frame></frames>\n</chunk></document>\n");
    xml
}
