use crate::filter::{filter_frame, SpatialFilter};
use crate::image::{Frame, FrameView};
use crate::motion::{
    process_center_alarm, process_roi_diff, AlarmConfig, AlarmOutcome, MotionContext, RoiConfig,
    RoiOutcome,
};
use crate::pipeline::{FilterMode, PipelineConfig};
use crate::pixel::Rgb565;
use crate::util::CamFilterResult;

/// One full-frame processing step, selected at runtime by [`FilterMode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterStage {
    Spatial { filter: SpatialFilter, border: Rgb565 },
    RoiDiff(RoiConfig),
    CenterAlarm(AlarmConfig),
}

/// What a stage wrote to its output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// Every output pixel was rewritten by a spatial filter.
    Filtered,
    Roi(RoiOutcome),
    Alarm(AlarmOutcome),
}

impl FilterStage {
    /// Selects the stage for `mode`, taking its parameters from `config`.
    pub fn for_mode(mode: FilterMode, config: &PipelineConfig) -> Self {
        match mode {
            FilterMode::RoiDiff => Self::RoiDiff(config.roi),
            FilterMode::CenterAlarm => Self::CenterAlarm(config.alarm),
            spatial => Self::Spatial {
                filter: spatial.spatial_filter().unwrap_or(SpatialFilter::Passthrough),
                border: config.border_fill,
            },
        }
    }

    /// Forgets this stage's history so its next frame is treated as the first.
    pub fn reset(&self, ctx: &mut MotionContext) {
        match self {
            Self::Spatial { .. } => {}
            Self::RoiDiff(_) => ctx.reset_roi(),
            Self::CenterAlarm(_) => ctx.reset_alarm(),
        }
    }

    /// Turns `input` into `output`; `now_ms` drives the alarm hold timer.
    pub fn process(
        &self,
        input: FrameView<'_>,
        output: &mut Frame,
        ctx: &mut MotionContext,
        now_ms: u64,
    ) -> CamFilterResult<StageOutcome> {
        match self {
            Self::Spatial { filter, border } => {
                filter_frame(input, output, *filter, *border)?;
                Ok(StageOutcome::Filtered)
            }
            Self::RoiDiff(cfg) => process_roi_diff(input, output, ctx, cfg).map(StageOutcome::Roi),
            Self::CenterAlarm(cfg) => {
                process_center_alarm(input, output, ctx, cfg, now_ms).map(StageOutcome::Alarm)
            }
        }
    }
}
