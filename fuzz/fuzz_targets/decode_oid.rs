#![no_main]

use std::sync::Arc;
use libfuzzer_sys::fuzz_target;
use derschema::{Format, Model, Registry};

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();
    let id = registry.define("Oid", |d| { d.objid(); }).unwrap();
    let model = Model::new(Arc::new(registry), id).unwrap();

    let value = match model.decode(data.to_vec(), Format::Der) {
        Ok(value) => value,
        Err(_) => return,
    };
    let _ = value.as_oid().unwrap().to_string();

    let encoded = model.encode(&value, Format::Der).unwrap();
    assert_eq!(model.decode(encoded, Format::Der).unwrap(), value);
});
