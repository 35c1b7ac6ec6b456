#![no_main]

use libfuzzer_sys::fuzz_target;
use tagstream::{NoopHandler, Parser};

fuzz_target!(|data: &[u8]| {
    let mut parser = Parser::new(NoopHandler);
    let _ = parser.parse(data);
});
