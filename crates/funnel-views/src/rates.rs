//! Conversion and drop-off rates per stage

use funnel_core::FunnelError;
use funnel_data::FunnelDataset;
use tracing::debug;

/// Rates of one stage, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEntry {
    /// Share of the first stage's total retained at this stage
    pub conversion: f64,
    /// Share lost relative to the preceding stage; `None` for the first stage
    pub drop_off: Option<f64>,
}

/// `100 * part / whole` rounded half-up to `decimals` places, or
/// `DegenerateStage` when `whole` is zero.
///
/// The decimal scale is applied before dividing so that decimal ties such as
/// 1.005 round up instead of losing the tie to binary error.
pub fn percent(part: f64, whole: f64, decimals: u32, stage: &str) -> Result<f64, FunnelError> {
    if whole == 0.0 {
        return Err(FunnelError::DegenerateStage {
            stage: stage.to_string(),
        });
    }
    let factor = 10f64.powi(decimals as i32);
    Ok(((100.0 * part * factor) / whole + 0.5).floor() / factor)
}

/// Compute one entry per stage, in stage order
pub fn compute_rates(dataset: &FunnelDataset, decimals: u32) -> Vec<RateEntry> {
    let stages = dataset.stages();
    let Some(first) = stages.first() else {
        return Vec::new();
    };

    // A zero divisor is coerced to a 0% rate for that stage
    let guarded = |result: Result<f64, FunnelError>| match result {
        Ok(value) => value,
        Err(err) => {
            debug!("{}; rate set to 0", err);
            0.0
        }
    };

    stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let conversion = guarded(percent(stage.total(), first.total(), decimals, &first.label));
            let drop_off = (i > 0).then(|| {
                let previous = &stages[i - 1];
                guarded(percent(
                    previous.total() - stage.total(),
                    previous.total(),
                    decimals,
                    &previous.label,
                ))
            });
            RateEntry { conversion, drop_off }
        })
        .collect()
}

/// Display form of a percentage, e.g. `40%` or `12.5%`
pub fn format_percent(value: f64) -> String {
    format!("{}%", funnel_core::format_number(value))
}
