#![cfg(feature = "rayon")]

use camfilter::lowlevel::filter_frame_par;
use camfilter::{filter_frame, Frame, Geometry, Rgb565, SpatialFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn parallel_matches_sequential_for_every_filter() {
    let mut rng = StdRng::seed_from_u64(42);
    let geometry = Geometry::CAPTURE;
    let input = Frame::from_fn(geometry, |_, _| Rgb565(rng.random::<u16>())).unwrap();

    for filter in [
        SpatialFilter::Passthrough,
        SpatialFilter::Grayscale,
        SpatialFilter::EDGE_DETECT,
        SpatialFilter::BLUR,
    ] {
        let mut seq = Frame::new(geometry).unwrap();
        let mut par = Frame::new(geometry).unwrap();
        filter_frame(input.view(), &mut seq, filter, Rgb565::BLACK).unwrap();
        filter_frame_par(input.view(), &mut par, filter, Rgb565::BLACK).unwrap();
        assert_eq!(seq, par, "{filter:?}");
    }
}
