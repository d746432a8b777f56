#![no_main]

use std::sync::Arc;
use libfuzzer_sys::fuzz_target;
use derschema::{Format, Model, Registry};

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();
    let id = registry.define("Strings", |d| {
        d.choice([
            ("utf8", d.utf8str()),
            ("numeric", d.numstr()),
            ("printable", d.printstr()),
            ("teletex", d.t61str()),
            ("ia5", d.ia5str()),
            ("visible", d.iso646str()),
            ("universal", d.unistr()),
            ("bmp", d.bmpstr()),
        ]);
    }).unwrap();
    let model = Model::new(Arc::new(registry), id).unwrap();

    let value = match model.decode(data.to_vec(), Format::Der) {
        Ok(value) => value,
        Err(_) => return,
    };
    let encoded = model.encode(&value, Format::Der).unwrap();
    assert_eq!(model.decode(encoded, Format::Der).unwrap(), value);
});
