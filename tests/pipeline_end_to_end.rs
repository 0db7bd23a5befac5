use camfilter::lowlevel::{AlarmOutcome, RoiOutcome, BORDER_ROWS};
use camfilter::pipeline::DEFAULT_ROW_TIMEOUT;
use camfilter::{
    filter_frame, CamFilterError, CamFilterResult, CompletionSignal, FilterMode, Frame, FrameSource,
    Geometry, ManualClock, MemorySource, ModeSelector, Pipeline, PipelineConfig, Region, Rgb565,
    RoiConfig, ScreenSink, SpatialFilter, StageOutcome, WriterSink,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Duration, Instant};

const SMALL: Geometry = Geometry {
    width: 48,
    height: 36,
};

fn random_frame(geometry: Geometry, seed: u64) -> Frame {
    let mut rng = StdRng::seed_from_u64(seed);
    Frame::from_fn(geometry, |_, _| Rgb565(rng.random::<u16>())).unwrap()
}

fn config(geometry: Geometry) -> PipelineConfig {
    PipelineConfig {
        geometry,
        ..PipelineConfig::default()
    }
}

fn pipeline(
    frames: Vec<Frame>,
    config: PipelineConfig,
) -> Pipeline<MemorySource, ScreenSink, ManualClock> {
    let source = MemorySource::new(frames).unwrap();
    let sink = ScreenSink::new(config.geometry).unwrap();
    Pipeline::new(source, sink, ManualClock::new(0), config).unwrap()
}

#[test]
fn passthrough_shows_the_captured_frame() {
    let input = random_frame(SMALL, 1);
    let mut pipe = pipeline(vec![input.clone()], config(SMALL));
    let report = pipe.run_frame().unwrap();
    assert_eq!(report.index, 0);
    assert_eq!(report.mode, FilterMode::None);
    assert_eq!(report.outcome, StageOutcome::Filtered);
    assert_eq!(pipe.sink().screen(), &input);
    assert_eq!(pipe.source().rows_delivered(), SMALL.height);
}

#[test]
fn mode_switch_lands_on_the_next_frame() {
    let input = random_frame(SMALL, 2);
    let selector = ModeSelector::new(FilterMode::None);
    let mut pipe = pipeline(vec![input.clone()], config(SMALL)).with_selector(selector.clone());

    pipe.run_frame().unwrap();
    selector.set(FilterMode::EdgeDetect);
    assert_eq!(pipe.mode(), FilterMode::None);
    assert_eq!(pipe.sink().screen(), &input);

    let report = pipe.run_frame().unwrap();
    assert_eq!(report.mode, FilterMode::EdgeDetect);
    let mut expected = Frame::new(SMALL).unwrap();
    filter_frame(input.view(), &mut expected, SpatialFilter::EDGE_DETECT, Rgb565::WHITE).unwrap();
    let screen = pipe.sink().screen();
    for y in BORDER_ROWS..SMALL.height - BORDER_ROWS {
        assert_eq!(screen.row(y), expected.row(y), "row {y}");
    }
    assert!(screen.row(0).unwrap().iter().all(|&px| px == Rgb565::WHITE));
    assert!(screen.row(SMALL.height - 1).unwrap().iter().all(|&px| px == Rgb565::WHITE));
}

#[test]
fn unknown_mode_value_behaves_as_passthrough() {
    let input = random_frame(SMALL, 3);
    let mut pipe = pipeline(vec![input.clone()], config(SMALL));
    pipe.selector().set_raw(200);
    let report = pipe.run_frame().unwrap();
    assert_eq!(report.mode, FilterMode::None);
    assert_eq!(pipe.sink().screen(), &input);
}

#[test]
fn buffered_blur_matches_full_frame_filter() {
    let input = random_frame(SMALL, 4);
    let cfg = PipelineConfig {
        row_streaming: false,
        ..config(SMALL)
    };
    let mut pipe = pipeline(vec![input.clone()], cfg);
    pipe.selector().set(FilterMode::Blur);
    pipe.run_frame().unwrap();

    let mut expected = Frame::new(SMALL).unwrap();
    filter_frame(input.view(), &mut expected, SpatialFilter::BLUR, Rgb565::WHITE).unwrap();
    assert_eq!(pipe.sink().screen(), &expected);
}

#[test]
fn grayscale_is_identical_in_both_paths() {
    let input = random_frame(SMALL, 5);
    let mut streamed = pipeline(vec![input.clone()], config(SMALL));
    let mut buffered = pipeline(
        vec![input],
        PipelineConfig {
            row_streaming: false,
            ..config(SMALL)
        },
    );
    for pipe in [&mut streamed, &mut buffered] {
        pipe.selector().set(FilterMode::Grayscale);
        pipe.run_frame().unwrap();
    }
    assert_eq!(streamed.sink().screen(), buffered.sink().screen());
}

#[test]
fn capture_timeout_floods_error_color_and_halts() {
    let input = random_frame(SMALL, 6);
    let source = MemorySource::new(vec![input]).unwrap().stall_after(5);
    let sink = ScreenSink::new(SMALL).unwrap();
    let cfg = PipelineConfig {
        row_timeout: Duration::from_millis(20),
        ..config(SMALL)
    };
    let mut pipe = Pipeline::new(source, sink, ManualClock::new(0), cfg).unwrap();

    let started = Instant::now();
    let err = pipe.run_frame().unwrap_err();
    let elapsed = started.elapsed();
    assert_eq!(
        err,
        CamFilterError::CaptureTimeout {
            row: 5,
            timeout_ms: 20,
        }
    );
    assert!(elapsed >= Duration::from_millis(20));
    assert!(elapsed < cfg.row_timeout + DEFAULT_ROW_TIMEOUT, "took {elapsed:?}");
    assert!(pipe.is_halted());
    assert!(pipe.sink().screen().as_slice().iter().all(|&px| px == Rgb565::RED));

    assert_eq!(pipe.run_frame().unwrap_err(), CamFilterError::Halted);
    assert_eq!(pipe.run(3).unwrap_err(), CamFilterError::Halted);
    assert_eq!(pipe.frames_processed(), 0);
}

#[test]
fn default_row_timeout_is_one_hundred_ms() {
    assert_eq!(DEFAULT_ROW_TIMEOUT, Duration::from_millis(100));
    assert_eq!(PipelineConfig::default().row_timeout, DEFAULT_ROW_TIMEOUT);
}

#[test]
fn source_of_another_geometry_is_rejected_up_front() {
    let narrow = Geometry::new(40, 30).unwrap();
    let input = Frame::filled(narrow, Rgb565::WHITE).unwrap();
    let source = MemorySource::new(vec![input]).unwrap();
    let sink = ScreenSink::new(SMALL).unwrap();
    let err = Pipeline::new(source, sink, ManualClock::new(0), config(SMALL))
        .err()
        .unwrap();
    assert_eq!(
        err,
        CamFilterError::GeometryMismatch {
            expected_width: SMALL.width,
            expected_height: SMALL.height,
            width: 40,
            height: 30,
        }
    );
}

/// Claims the pipeline geometry but delivers narrower rows.
struct NarrowRowSource {
    inner: MemorySource,
}

impl FrameSource for NarrowRowSource {
    fn geometry(&self) -> Geometry {
        SMALL
    }

    fn start_row_capture(&mut self, dest: &mut [Rgb565]) -> CamFilterResult<()> {
        self.inner.start_row_capture(dest)
    }

    fn completion(&self) -> &CompletionSignal {
        self.inner.completion()
    }
}

#[test]
fn short_rows_fail_the_frame_instead_of_leaving_stale_pixels() {
    let narrow = Geometry::new(40, SMALL.height).unwrap();
    let input = Frame::filled(narrow, Rgb565::WHITE).unwrap();
    let source = NarrowRowSource {
        inner: MemorySource::new(vec![input]).unwrap(),
    };
    let sink = ScreenSink::new(SMALL).unwrap();
    let mut pipe = Pipeline::new(source, sink, ManualClock::new(0), config(SMALL)).unwrap();
    let err = pipe.run_frame().unwrap_err();
    assert_eq!(
        err,
        CamFilterError::GeometryMismatch {
            expected_width: 40,
            expected_height: SMALL.height,
            width: SMALL.width,
            height: SMALL.height,
        }
    );
    assert_eq!(pipe.sink().full_frames(), 0);
}

#[test]
fn roi_mode_sends_only_changed_blocks() {
    let geometry = Geometry::new(100, 80).unwrap();
    let first = random_frame(geometry, 7);
    let mut second = first.clone();
    // Anchor (40, 40) changes; no other anchor does.
    let flipped = if first.get(40, 40).unwrap().to_luma() < 128 {
        Rgb565::WHITE
    } else {
        Rgb565::BLACK
    };
    second.set(40, 40, flipped).unwrap();

    let mut pipe = pipeline(vec![first.clone(), second.clone()], config(geometry));
    pipe.selector().set(FilterMode::RoiDiff);

    let primed = pipe.run_frame().unwrap();
    assert_eq!(primed.outcome, StageOutcome::Roi(RoiOutcome::Primed));
    assert_eq!(pipe.sink().full_frames(), 1);

    let updated = pipe.run_frame().unwrap();
    assert_eq!(updated.outcome, StageOutcome::Roi(RoiOutcome::Updated { regions: 1 }));
    let RoiConfig {
        block_width: bw,
        block_height: bh,
        ..
    } = RoiConfig::default();
    let block = Region {
        x: 40 - bw,
        y: 40 - bh,
        width: 2 * bw,
        height: 2 * bh,
    };
    assert_eq!(pipe.context().updated_regions(), &[block]);
    assert_eq!(pipe.sink().full_frames(), 1);
    assert_eq!(pipe.sink().region_writes(), block.height);
    assert_eq!(pipe.sink().region_pixels(), block.width * block.height);
    assert_eq!(pipe.sink().screen(), &second);
}

#[test]
fn alarm_holds_for_its_duration_on_the_pipeline_clock() {
    let dark = Frame::new(Geometry::CAPTURE).unwrap();
    let bright = Frame::filled(Geometry::CAPTURE, Rgb565::WHITE).unwrap();
    let frames = vec![dark, bright.clone(), bright.clone(), bright.clone()];
    let source = MemorySource::new(frames).unwrap();
    let sink = ScreenSink::new(Geometry::CAPTURE).unwrap();
    let clock = ManualClock::new(0);
    let cfg = PipelineConfig::default();
    let mut pipe = Pipeline::new(source, sink, clock.clone(), cfg).unwrap();
    pipe.selector().set(FilterMode::CenterAlarm);

    let mut step = |advance_ms: u64| {
        clock.advance(advance_ms);
        match pipe.run_frame().unwrap().outcome {
            StageOutcome::Alarm(outcome) => (outcome, pipe.sink().screen().clone()),
            other => panic!("unexpected outcome {other:?}"),
        }
    };

    assert_eq!(step(0).0, AlarmOutcome::Primed);
    let (outcome, screen) = step(100);
    assert_eq!(outcome, AlarmOutcome::Triggered);
    assert!(screen.as_slice().iter().all(|&px| px == cfg.alarm.color));

    let (outcome, screen) = step(100);
    assert_eq!(outcome, AlarmOutcome::Overlay);
    assert_eq!(screen.get(0, 0), Some(Rgb565::WHITE));
    assert_eq!(screen.get(120, 80), Some(cfg.alarm.color));

    let (outcome, screen) = step(cfg.alarm.duration_ms);
    assert_eq!(outcome, AlarmOutcome::Clear);
    assert_eq!(screen, bright);
}

#[test]
fn wire_sink_receives_two_bytes_per_pixel() {
    let input = random_frame(SMALL, 8);
    let source = MemorySource::new(vec![input.clone()]).unwrap();
    let sink = WriterSink::new(Vec::new());
    let mut pipe = Pipeline::new(source, sink, ManualClock::new(0), config(SMALL)).unwrap();
    assert_eq!(pipe.run(2).unwrap(), 2);
    assert_eq!(pipe.sink().bytes_written(), 2 * 2 * SMALL.len() as u64);
}

#[test]
fn mismatched_sink_geometry_is_reported() {
    let input = random_frame(SMALL, 9);
    let source = MemorySource::new(vec![input]).unwrap();
    let sink = ScreenSink::new(Geometry::new(10, 10).unwrap()).unwrap();
    let mut pipe = Pipeline::new(source, sink, ManualClock::new(0), config(SMALL)).unwrap();
    let err = pipe.run_frame().unwrap_err();
    assert_eq!(
        err,
        CamFilterError::GeometryMismatch {
            expected_width: 10,
            expected_height: 10,
            width: SMALL.width,
            height: SMALL.height,
        }
    );
}

/// Completes each transfer from a worker thread, like a DMA interrupt.
struct ThreadedSource {
    frame: Frame,
    row: usize,
    signal: CompletionSignal,
}

impl FrameSource for ThreadedSource {
    fn geometry(&self) -> Geometry {
        self.frame.geometry()
    }

    fn start_row_capture(&mut self, dest: &mut [Rgb565]) -> CamFilterResult<()> {
        let src = self.frame.row(self.row).ok_or(CamFilterError::InvalidInput("row"))?;
        dest.copy_from_slice(src);
        self.row = (self.row + 1) % self.frame.height();
        let signal = self.signal.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_micros(200));
            signal.raise();
        });
        Ok(())
    }

    fn completion(&self) -> &CompletionSignal {
        &self.signal
    }
}

#[test]
fn completion_from_another_thread_is_awaited() {
    let geometry = Geometry::new(16, 8).unwrap();
    let input = random_frame(geometry, 10);
    let source = ThreadedSource {
        frame: input.clone(),
        row: 0,
        signal: CompletionSignal::new(),
    };
    let sink = ScreenSink::new(geometry).unwrap();
    let mut pipe = Pipeline::new(source, sink, ManualClock::new(0), config(geometry)).unwrap();
    pipe.run(2).unwrap();
    assert_eq!(pipe.sink().screen(), &input);
}
