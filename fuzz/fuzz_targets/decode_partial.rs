#![no_main]

use std::sync::Arc;
use libfuzzer_sys::fuzz_target;
use derschema::{DecodeOptions, Format, Model, Registry};

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();
    let algorithm = registry.define("AlgorithmIdentifier", |d| {
        d.seq().obj([
            d.key("algorithm").objid(),
            d.key("parameters").any().optional(),
        ]);
    }).unwrap();
    let id = registry.define("Info", |d| {
        d.seq().obj([
            d.key("version").explicit(0).int().def(0u8),
            d.key("algorithms").setof(algorithm),
            d.key("key").bitstr(),
            d.key("created").choice([
                ("utc", d.utctime()),
                ("general", d.gentime()),
            ]).optional(),
            d.key("note").implicit(1).utf8str().optional(),
        ]);
    }).unwrap();
    let model = Model::new(Arc::new(registry), id).unwrap();

    let mut ranges = Vec::new();
    let full = model.decode_with(
        data.to_vec(), Format::Der,
        DecodeOptions::new().track(|_, start, end| ranges.push((start, end)))
    );
    for (start, end) in ranges {
        assert!(start <= end && end <= data.len());
    }

    let partial = model.decode_partial(
        data.to_vec(), Format::Der, DecodeOptions::new()
    );
    if let Ok(value) = full {
        assert!(partial.is_complete());
        assert_eq!(partial.result, Some(value));
    }
});
