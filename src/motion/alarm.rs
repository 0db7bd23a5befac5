//! Center-region alarm state machine.
//!
//! While inactive, every frame sums `current_luma ^ previous_luma` over a
//! square centered on the frame. A sum above the threshold floods the whole
//! output with the alarm color and starts the alarm clock. While active, the
//! live input is shown with the alarm color painted over the center square;
//! once the duration has elapsed the alarm clears and the same frame is
//! evaluated again as an inactive one.

use crate::image::{Frame, FrameView, Geometry};
use crate::motion::{MotionContext, Region};
use crate::pixel::Rgb565;
use crate::trace::{trace_event, trace_span};
use crate::util::CamFilterResult;

/// Center square, trigger level and hold time for the alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlarmConfig {
    /// Side of the watched square, centered on the frame midpoint.
    pub center_size: usize,
    /// Accumulated XOR difference that must be exceeded to trigger.
    pub threshold: u32,
    /// How long the alarm stays active once triggered.
    pub duration_ms: u64,
    /// Flood and overlay color.
    pub color: Rgb565,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            center_size: 60,
            threshold: 25_000,
            duration_ms: 3_000,
            color: Rgb565::YELLOW,
        }
    }
}

/// Whether the alarm is holding, and since when.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlarmState {
    #[default]
    Inactive,
    Active {
        since_ms: u64,
    },
}

impl AlarmState {
    /// Returns true while the alarm is holding.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// What an alarm pass wrote to the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmOutcome {
    /// First frame: output is a full copy of the input.
    Primed,
    /// No alarm: output is a full copy of the input.
    Clear,
    /// The alarm fired this frame: output is entirely the alarm color.
    Triggered,
    /// The alarm is holding: input with the center square painted.
    Overlay,
}

/// The watched square for `geometry`, clipped to the frame.
pub fn center_region(geometry: Geometry, size: usize) -> Option<Region> {
    let size = size as isize;
    let x0 = (geometry.width / 2) as isize - size / 2;
    let y0 = (geometry.height / 2) as isize - size / 2;
    Region::clipped(x0, y0, x0 + size, y0 + size, geometry)
}

/// Sums the luma XOR of `current` and `previous` over `region`, returning as
/// soon as the running sum exceeds `limit`.
pub fn center_change(
    current: FrameView<'_>,
    previous: FrameView<'_>,
    region: Region,
    limit: u32,
) -> u32 {
    let mut sum = 0u32;
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            sum += u32::from(current.luma_at(x, y) ^ previous.luma_at(x, y));
            if sum > limit {
                return sum;
            }
        }
    }
    sum
}

/// Runs one alarm cycle at time `now_ms` and replaces the previous frame
/// with `input`.
pub fn process_center_alarm(
    input: FrameView<'_>,
    output: &mut Frame,
    ctx: &mut MotionContext,
    cfg: &AlarmConfig,
    now_ms: u64,
) -> CamFilterResult<AlarmOutcome> {
    let geometry = input.geometry();
    ctx.geometry().ensure_same(geometry)?;
    output.geometry().ensure_same(geometry)?;

    if !ctx.alarm_primed {
        output.copy_from(input)?;
        ctx.remember(input)?;
        ctx.alarm_primed = true;
        ctx.alarm = AlarmState::Inactive;
        return Ok(AlarmOutcome::Primed);
    }

    let _span = trace_span!("center_alarm").entered();
    let region = center_region(geometry, cfg.center_size);

    if let AlarmState::Active { since_ms } = ctx.alarm {
        if now_ms.saturating_sub(since_ms) < cfg.duration_ms {
            output.copy_from(input)?;
            if let Some(region) = region {
                region.fill(output, cfg.color);
            }
            ctx.remember(input)?;
            return Ok(AlarmOutcome::Overlay);
        }
        trace_event!("alarm_cleared", at_ms = now_ms);
        ctx.alarm = AlarmState::Inactive;
    }

    let change = match region {
        Some(region) => center_change(input, ctx.previous.view(), region, cfg.threshold),
        None => 0,
    };
    let outcome = if change > cfg.threshold {
        output.fill(cfg.color);
        ctx.alarm = AlarmState::Active { since_ms: now_ms };
        trace_event!("alarm_triggered", at_ms = now_ms, change = change);
        AlarmOutcome::Triggered
    } else {
        output.copy_from(input)?;
        AlarmOutcome::Clear
    };
    ctx.remember(input)?;
    Ok(outcome)
}
