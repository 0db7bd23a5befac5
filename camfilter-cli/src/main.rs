use camfilter::io::{load_frame, save_frame};
use camfilter::lowlevel::{AlarmOutcome, RoiOutcome};
use camfilter::{
    AlarmConfig, FilterMode, FrameReport, Geometry, ManualClock, MemorySource, ModeSelector,
    Pipeline, PipelineConfig, Rgb565, RoiConfig, ScreenSink, StageOutcome,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "camfilter CLI: replay images through the video pipeline")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    None,
    EdgeDetect,
    Blur,
    Grayscale,
    RoiDiff,
    CenterAlarm,
}

impl From<ModeConfig> for FilterMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::None => FilterMode::None,
            ModeConfig::EdgeDetect => FilterMode::EdgeDetect,
            ModeConfig::Blur => FilterMode::Blur,
            ModeConfig::Grayscale => FilterMode::Grayscale,
            ModeConfig::RoiDiff => FilterMode::RoiDiff,
            ModeConfig::CenterAlarm => FilterMode::CenterAlarm,
        }
    }
}

fn mode_name(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::None => "none",
        FilterMode::EdgeDetect => "edge_detect",
        FilterMode::Blur => "blur",
        FilterMode::Grayscale => "grayscale",
        FilterMode::RoiDiff => "roi_diff",
        FilterMode::CenterAlarm => "center_alarm",
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PipelineConfigJson {
    width: usize,
    height: usize,
    row_timeout_ms: u64,
    row_streaming: bool,
    border_fill: u16,
    error_color: u16,
}

impl Default for PipelineConfigJson {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            width: cfg.geometry.width,
            height: cfg.geometry.height,
            row_timeout_ms: u64::try_from(cfg.row_timeout.as_millis()).unwrap_or(u64::MAX),
            row_streaming: cfg.row_streaming,
            border_fill: cfg.border_fill.raw(),
            error_color: cfg.error_color.raw(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RoiConfigJson {
    block_width: usize,
    block_height: usize,
    threshold: u8,
}

impl Default for RoiConfigJson {
    fn default() -> Self {
        let cfg = RoiConfig::default();
        Self {
            block_width: cfg.block_width,
            block_height: cfg.block_height,
            threshold: cfg.threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AlarmConfigJson {
    center_size: usize,
    threshold: u32,
    duration_ms: u64,
    color: u16,
}

impl Default for AlarmConfigJson {
    fn default() -> Self {
        let cfg = AlarmConfig::default();
        Self {
            center_size: cfg.center_size,
            threshold: cfg.threshold,
            duration_ms: cfg.duration_ms,
            color: cfg.color.raw(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    input_paths: Vec<String>,
    output_dir: Option<String>,
    frames: Option<usize>,
    mode: ModeConfig,
    cycle_every: Option<usize>,
    frame_interval_ms: u64,
    pipeline: PipelineConfigJson,
    roi: RoiConfigJson,
    alarm: AlarmConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            output_dir: None,
            frames: None,
            mode: ModeConfig::None,
            cycle_every: None,
            frame_interval_ms: 33,
            pipeline: PipelineConfigJson::default(),
            roi: RoiConfigJson::default(),
            alarm: AlarmConfigJson::default(),
        }
    }
}

impl Config {
    fn pipeline_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        Ok(PipelineConfig {
            geometry: Geometry::new(self.pipeline.width, self.pipeline.height)?,
            row_timeout: Duration::from_millis(self.pipeline.row_timeout_ms),
            row_streaming: self.pipeline.row_streaming,
            border_fill: Rgb565(self.pipeline.border_fill),
            error_color: Rgb565(self.pipeline.error_color),
            roi: RoiConfig {
                block_width: self.roi.block_width,
                block_height: self.roi.block_height,
                threshold: self.roi.threshold,
            },
            alarm: AlarmConfig {
                center_size: self.alarm.center_size,
                threshold: self.alarm.threshold,
                duration_ms: self.alarm.duration_ms,
                color: Rgb565(self.alarm.color),
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    index: u64,
    mode: &'static str,
    outcome: &'static str,
    regions: Option<usize>,
    alarm_active: bool,
    output_path: Option<String>,
}

impl FrameRecord {
    fn new(report: &FrameReport, alarm_active: bool, output_path: Option<String>) -> Self {
        let (outcome, regions) = match report.outcome {
            StageOutcome::Filtered => ("filtered", None),
            StageOutcome::Roi(RoiOutcome::Primed) => ("primed", None),
            StageOutcome::Roi(RoiOutcome::Updated { regions }) => ("updated", Some(regions)),
            StageOutcome::Alarm(AlarmOutcome::Primed) => ("primed", None),
            StageOutcome::Alarm(AlarmOutcome::Clear) => ("clear", None),
            StageOutcome::Alarm(AlarmOutcome::Triggered) => ("triggered", None),
            StageOutcome::Alarm(AlarmOutcome::Overlay) => ("overlay", None),
        };
        Self {
            index: report.index,
            mode: mode_name(report.mode),
            outcome,
            regions,
            alarm_active,
            output_path,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    frames_processed: u64,
    frames: Vec<FrameRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("camfilter=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_paths.is_empty() {
        return Err("input_paths must list at least one image".into());
    }
    if config.frames == Some(0) || config.cycle_every == Some(0) {
        return Err("frames and cycle_every must be at least 1".into());
    }

    let pipeline_config = config.pipeline_config()?;
    let geometry = pipeline_config.geometry;
    let frames = config
        .input_paths
        .iter()
        .map(|path| load_frame(path, geometry))
        .collect::<Result<Vec<_>, _>>()?;
    let frame_count = config.frames.unwrap_or(frames.len());

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
    }

    let clock = ManualClock::new(0);
    let selector = ModeSelector::new(config.mode.into());
    let source = MemorySource::new(frames)?;
    let sink = ScreenSink::new(geometry)?;
    let mut pipeline = Pipeline::new(source, sink, clock.clone(), pipeline_config)?
        .with_selector(selector.clone());

    let mut records = Vec::with_capacity(frame_count);
    for i in 0..frame_count {
        let report = pipeline.run_frame()?;
        let output_path = match &config.output_dir {
            Some(dir) => {
                let path = PathBuf::from(dir).join(format!("frame_{:04}.png", report.index));
                save_frame(pipeline.sink().screen(), &path)?;
                Some(path.display().to_string())
            }
            None => None,
        };
        let alarm_active = pipeline.context().alarm_state().is_active();
        records.push(FrameRecord::new(&report, alarm_active, output_path));

        clock.advance(config.frame_interval_ms);
        if config.cycle_every.is_some_and(|n| (i + 1) % n == 0) {
            let next = selector.cycle();
            tracing::info!(mode = mode_name(next), "button press");
        }
    }

    let output = Output {
        frames_processed: pipeline.frames_processed(),
        frames: records,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
