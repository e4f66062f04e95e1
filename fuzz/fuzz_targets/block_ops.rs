#![no_main]

use libfuzzer_sys::fuzz_target;
use transcode_blockdeint::Backend;

fuzz_target!(|data: &[u8]| {
    // Two 8x4 blocks at stride 16 plus a spatial filter source.
    const STRIDE: usize = 16;
    const BLOCK: usize = 3 * STRIDE + 8;
    const FILTER: usize = 4 * STRIDE + 10;
    if data.len() < 2 * BLOCK + FILTER {
        return;
    }
    let (a, rest) = data.split_at(BLOCK);
    let (b, rest) = rest.split_at(BLOCK);
    let src = &rest[..FILTER];

    let generic = Backend::Generic.ops();
    let mut expected = [0u8; 32];
    generic.spatial_filter(src, STRIDE, &mut expected, 8);

    for backend in Backend::available() {
        let ops = backend.ops();
        assert_eq!(ops.sad_8x4(a, STRIDE, b, STRIDE), generic.sad_8x4(a, STRIDE, b, STRIDE));
        assert_eq!(ops.variance_8x4(a, STRIDE), generic.variance_8x4(a, STRIDE));
        assert_eq!(ops.cac_8x8(a, STRIDE, b, STRIDE), generic.cac_8x8(a, STRIDE, b, STRIDE));

        let mut got = [0u8; 32];
        ops.spatial_filter(src, STRIDE, &mut got, 8);
        assert_eq!(got, expected, "backend {backend}");
    }
});
