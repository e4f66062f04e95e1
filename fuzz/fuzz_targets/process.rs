#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transcode_blockdeint::{
    process, process_woven, DeinterlaceContext, DeinterlaceMode, DeinterlaceParams, Picture,
    PictureMut, Plane, PlaneMut, RowRange,
};

#[derive(Arbitrary, Debug)]
struct ProcessInput {
    width: u8,
    field_height: u8,
    out_width: u8,
    out_height: u8,
    padding: u8,
    start_row: u16,
    num_rows: u16,
    current_top: bool,
    weave_mode: bool,
    disable_weave: bool,
    with_previous: bool,
    in_place: bool,
    band_rows: u8,
    samples: Vec<u8>,
}

fn fill(samples: &[u8], len: usize, salt: u8) -> Vec<u8> {
    if samples.is_empty() {
        return vec![salt; len];
    }
    (0..len).map(|i| samples[i % samples.len()] ^ salt).collect()
}

fuzz_target!(|input: ProcessInput| {
    // Keep frames small enough for fast iterations.
    let width = (input.width % 80) as usize + 1;
    let field_height = (input.field_height % 40) as usize + 1;
    let out_width = (input.out_width % 80) as usize + 1;
    let out_height = (input.out_height % 80) as usize + 1;
    let stride = width + (input.padding % 16) as usize;
    let out_stride = out_width + (input.padding % 8) as usize;

    let len = stride * field_height;
    let previous = fill(&input.samples, len, 0x11);
    let top = fill(&input.samples, len, 0x5a);
    let bottom = fill(&input.samples, len, 0xa5);
    let mut frame = fill(&input.samples, out_stride * out_height, 0x3c);

    let plane = |data| Plane::new(data, width, field_height, stride).map(Picture::gray);
    let (Ok(previous), Ok(top), Ok(bottom)) = (plane(&previous[..]), plane(&top[..]), plane(&bottom[..]))
    else {
        return;
    };
    let Ok(out) = PlaneMut::new(&mut frame, out_width, out_height, out_stride) else {
        return;
    };
    let mut out = PictureMut::gray(out);

    let mode = if input.weave_mode {
        DeinterlaceMode::Weave
    } else {
        DeinterlaceMode::Spatial
    };
    let params = DeinterlaceParams::new()
        .with_mode(mode)
        .with_current_field_top(input.current_top)
        .with_disable_weave(input.disable_weave);
    let ctx = DeinterlaceContext::new(&params);
    let previous = input.with_previous.then_some(&previous);
    let range = RowRange::new(input.start_row as u32, input.num_rows as u32);

    if input.in_place {
        let _ = process_woven(Some(&ctx), previous, &mut out, &params, range);
    } else if input.band_rows > 0 {
        for (range, mut band) in out.split_bands(input.band_rows as u32) {
            let _ = process(Some(&ctx), previous, &top, &bottom, &mut band, &params, range);
        }
    } else {
        let _ = process(Some(&ctx), previous, &top, &bottom, &mut out, &params, range);
    }
});
