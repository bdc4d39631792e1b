//! Fuzz target for marker XML parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the marker XML parser and
//! writes whatever parses, checking for panics, crashes, or hangs.

#![no_main]

use gcpconv::ir::io_gcp_txt::to_gcp_string;
use gcpconv::ir::io_marker_xml::from_marker_xml_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    if let Ok(doc) = from_marker_xml_slice(data) {
        let _ = to_gcp_string(&doc, "+proj=longlat");
    }
});
