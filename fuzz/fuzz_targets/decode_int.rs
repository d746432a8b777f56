#![no_main]

use std::sync::Arc;
use libfuzzer_sys::fuzz_target;
use derschema::{Format, Model, Registry};

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();
    let id = registry.define("Int", |d| { d.int(); }).unwrap();
    let model = Model::new(Arc::new(registry), id).unwrap();

    let value = match model.decode(data.to_vec(), Format::Der) {
        Ok(value) => value,
        Err(_) => return,
    };
    let int = value.as_int().unwrap();
    if let Some(small) = int.to_u64() {
        assert_eq!(Some(u128::from(small)), int.to_u128());
    }

    let encoded = model.encode(&value, Format::Der).unwrap();
    assert!(encoded.len() <= data.len());
    assert_eq!(model.decode(encoded, Format::Der).unwrap(), value);
});
