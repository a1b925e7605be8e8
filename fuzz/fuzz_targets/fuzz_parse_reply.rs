#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Replies arrive as raw serial bytes and are decoded lossily
    let reply = String::from_utf8_lossy(data);

    let _ = lakeshore335::driver::parse_float_reply(&reply);
    if let Ok(code) = lakeshore335::driver::parse_int_reply(&reply) {
        let _ = lakeshore335::HeaterRange::try_from(code);
        let _ = lakeshore335::driver::LoopInput::try_from(code);
    }
    let _ = lakeshore335::Request::classify(reply.as_ref());
});
