//! Property-based tests for the block primitives and backend equivalence.
//!
//! Every backend the running CPU supports must produce exactly what the
//! generic code produces, primitive by primitive and frame by frame.

use proptest::prelude::*;
use transcode_blockdeint::cac::cac_8x8;
use transcode_blockdeint::metrics::{sad_8x4, variance_8x4};
use transcode_blockdeint::spatial::spatial_filter;
use transcode_blockdeint::{
    process, Backend, DeinterlaceContext, DeinterlaceParams, Picture, PictureMut, Plane, PlaneMut,
    RowRange,
};

fn block(stride: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 3 * stride + 8)
}

fn run_frame(
    backend: Backend,
    fields: &[Vec<u8>; 3],
    width: usize,
    height: usize,
    current_top: bool,
) -> Vec<u8> {
    let params = DeinterlaceParams::new().with_current_field_top(current_top);
    let ctx = DeinterlaceContext::with_backend(backend);
    let field_height = height / 2;
    let plane = |data| Picture::gray(Plane::new(data, width, field_height, width).unwrap());

    let mut frame = vec![0u8; width * height];
    let mut out = PictureMut::gray(PlaneMut::new(&mut frame, width, height, width).unwrap());
    process(
        Some(&ctx),
        Some(&plane(&fields[0][..])),
        &plane(&fields[1][..]),
        &plane(&fields[2][..]),
        &mut out,
        &params,
        RowRange::full(height as u32),
    )
    .unwrap();
    frame
}

// =============================================================================
// Metric identities
// =============================================================================

proptest! {
    /// SAD of a block with itself is zero.
    #[test]
    fn sad_self_identity(a in block(8)) {
        prop_assert_eq!(sad_8x4(&a, 8, &a, 8), 0);
    }

    /// SAD is symmetric.
    #[test]
    fn sad_symmetric(a in block(11), b in block(9)) {
        prop_assert_eq!(sad_8x4(&a, 11, &b, 9), sad_8x4(&b, 9, &a, 11));
    }

    /// A constant block has zero variance.
    #[test]
    fn variance_constant_block(v in any::<u8>(), stride in 8usize..32) {
        let a = vec![v; 3 * stride + 8];
        prop_assert_eq!(variance_8x4(&a, stride), 0);
    }

    /// The detector is a pure function of its inputs.
    #[test]
    fn cac_deterministic(top in block(8), bot in block(8)) {
        prop_assert_eq!(cac_8x8(&top, 8, &bot, 8), cac_8x8(&top, 8, &bot, 8));
        prop_assert_eq!(cac_8x8(&bot, 8, &top, 8), cac_8x8(&bot, 8, &top, 8));
    }

    /// Interpolated samples stay within the range of the source samples.
    #[test]
    fn spatial_filter_bounded(src in prop::collection::vec(any::<u8>(), 4 * 12 + 10)) {
        let mut out = [0u8; 32];
        spatial_filter(&src, 12, &mut out, 8);
        let (lo, hi) = (src.iter().min().copied().unwrap(), src.iter().max().copied().unwrap());
        prop_assert!(out.iter().all(|&v| v >= lo && v <= hi));
    }
}

// =============================================================================
// Backend equivalence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every available backend agrees with the generic primitives.
    #[test]
    fn primitives_match_generic(
        a in block(16),
        b in block(16),
        src in prop::collection::vec(any::<u8>(), 4 * 16 + 10),
    ) {
        let generic = Backend::Generic.ops();
        for backend in Backend::available() {
            let ops = backend.ops();
            prop_assert_eq!(ops.sad_8x4(&a, 16, &b, 16), generic.sad_8x4(&a, 16, &b, 16));
            prop_assert_eq!(ops.variance_8x4(&a, 16), generic.variance_8x4(&a, 16));
            prop_assert_eq!(ops.cac_8x8(&a, 16, &b, 16), generic.cac_8x8(&a, 16, &b, 16));

            let mut expected = [0u8; 32];
            let mut got = [0u8; 32];
            generic.spatial_filter(&src, 16, &mut expected, 8);
            ops.spatial_filter(&src, 16, &mut got, 8);
            prop_assert_eq!(got, expected);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whole frames are byte-identical across backends.
    #[test]
    fn frames_match_generic(
        width in 9usize..48,
        half_height in 5usize..20,
        current_top in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let height = half_height * 2;
        let mut state = seed | 1;
        let mut noise = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        };
        let fields: [Vec<u8>; 3] = std::array::from_fn(|_| {
            (0..width * half_height).map(|_| noise()).collect()
        });

        let expected = run_frame(Backend::Generic, &fields, width, height, current_top);
        for backend in Backend::available() {
            let got = run_frame(backend, &fields, width, height, current_top);
            prop_assert_eq!(&got, &expected, "backend {}", backend);
        }
    }
}
