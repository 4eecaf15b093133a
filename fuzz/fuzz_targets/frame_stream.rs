#![no_main]

use codec::CodecLimits;
use libfuzzer_sys::fuzz_target;
use protocols::Endpoint;
use transport::{drain_frames, ReadBuffer};

fuzz_target!(|data: &[u8]| {
    let Ok(registry) = protocols::registry() else {
        return;
    };
    let endpoint = match data.first().map(|b| b % 3) {
        Some(0) => Endpoint::ADMIN,
        Some(1) => Endpoint::SERVER_QUERY,
        _ => Endpoint::MASTER_SERVER,
    };
    let table = endpoint.recv_table(&registry);
    let wire_limits = wire::Limits::default();
    let codec_limits = CodecLimits::for_testing();

    // Everything at once.
    let mut whole_ctx = endpoint.context();
    let mut whole = Vec::new();
    let drained = drain_frames(
        data,
        &table,
        &mut whole_ctx,
        &wire_limits,
        &codec_limits,
        &mut whole,
    );
    assert!(drained.consumed <= data.len());

    // The same bytes fed in uneven chunks through a read buffer.
    let mut ctx = endpoint.context();
    let mut buffer = ReadBuffer::new();
    let mut chunked = Vec::new();
    let mut failed = false;
    for chunk in data.chunks(usize::from(data.get(1).copied().unwrap_or(1)).max(1)) {
        buffer.extend(chunk);
        let mut pending = buffer.take();
        let result = drain_frames(
            &pending,
            &table,
            &mut ctx,
            &wire_limits,
            &codec_limits,
            &mut chunked,
        );
        if result.error.is_some() {
            failed = true;
            break;
        }
        buffer.restore(pending.split_off(result.consumed));
    }

    if !failed {
        assert_eq!(chunked, whole);
        assert_eq!(ctx, whole_ctx);
    }
});
