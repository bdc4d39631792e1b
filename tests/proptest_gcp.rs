mod proptest_helpers;

use std::collections::HashMap;

use gcpconv::ir::io_gcp_txt::to_gcp_string;
use gcpconv::ir::io_marker_xml::from_marker_xml_str;
use gcpconv::ir::normalize_label;
use proptest::prelude::*;
use proptest_helpers::{arb_export, proptest_config, to_xml, Export};

fn expected_rows(export: &Export) -> Vec<String> {
    let markers: HashMap<u8, (f64, f64, f64)> = export
        .markers
        .iter()
        .map(|(id, x, y, z)| (*id, (*x, *y, *z)))
        .collect();
    let cameras: HashMap<u8, String> = export
        .cameras
        .iter()
        .map(|(id, label)| (*id, normalize_label(label.clone())))
        .collect();

    export
        .observations
        .iter()
        .filter_map(|(marker, camera, px, py)| {
            let (x, y, z) = markers.get(marker)?;
            let label = cameras.get(camera)?;
            Some(format!(
                "{x:.9}\t{y:.9}\t{z:.9}\t{px:.6}\t{py:.6}\t{label}"
            ))
        })
        .collect()
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn rows_match_last_write_wins_join(export in arb_export()) {
        let doc = from_marker_xml_str(&to_xml(&export)).expect("parse generated xml");
        let text = to_gcp_string(&doc, "+proj=longlat");

        let mut lines = text.lines();
        prop_assert_eq!(lines.next(), Some("+proj=longlat\t"));
        let rows: Vec<String> = lines.map(ToOwned::to_owned).collect();
        prop_assert_eq!(rows, expected_rows(&export));
    }

    #[test]
    fn every_row_has_six_fixed_point_fields(export in arb_export()) {
        let doc = from_marker_xml_str(&to_xml(&export)).expect("parse generated xml");
        let text = to_gcp_string(&doc, "header");

        for row in text.lines().skip(1) {
            let fields: Vec<&str> = row.split('\t').collect();
            prop_assert_eq!(fields.len(), 6);
            for (idx, field) in fields[..5].iter().enumerate() {
                let decimals = field.rsplit_once('.').map(|(_, d)| d.len());
                let expected = if idx < 3 { 9 } else { 6 };
                prop_assert_eq!(decimals, Some(expected), "field {} = {}", idx, field);
                prop_assert!(!field.contains('e'));
            }
            prop_assert!(fields[5].is_empty() || fields[5].ends_with(".JPG"));
        }
    }
}
