#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use tabwire::{
    schema::{to_json, verify_with_schema},
    File, Schema, Table, VerifierConfig,
};

fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::from_json(include_str!("../../tests/data/monster.layout.json"))
            .expect("Monster layout must load")
    })
}

fuzz_target!(|data: &[u8]| {
    let _ = tabwire::verify_root::<Table>(data);
    let _ = tabwire::verify_root_with_opts::<Table>(&VerifierConfig::relaxed(), data);

    if verify_with_schema(schema(), data, &VerifierConfig::default()).is_ok() {
        // Whatever the verifier accepts must render without panicking.
        let _ = to_json(schema(), data).expect("verified buffer must render");
    }

    if let Ok(file) = File::from_mem(data.to_vec()) {
        let _ = file.root::<Table>();
    }
});
