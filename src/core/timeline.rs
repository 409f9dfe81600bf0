//! Timeline step-selection controller.
//!
//! Two cursors, formalized as named fields with explicit operations:
//! - **preview**: follows pointer-move, non-committing, feeds the transient
//!   per-metric callouts. Pointer-leave reverts it to the pinned value
//!   without notifying anyone.
//! - **pinned**: set on click or programmatic pin; this is the cursor that
//!   drives harmonization, layout and view state through the commit
//!   protocol (run by the composition root, not here).
//!
//! Pointer x-positions map through a linear scale over [0, step_count) with
//! ordinary nearest-integer rounding, clamped to the valid index range.

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::entities::StepRecord;
use crate::error::DataError;
use crate::utils::{nearest_step, LinearScale};

/// Leading samples inspected for integer/continuous classification.
const CLASSIFY_SAMPLES: usize = 15;

/// Storage for one metric across all steps. The width is picked by
/// classification: a series whose first `CLASSIFY_SAMPLES` samples are all
/// whole numbers is stored integer-valued. This governs storage and tick
/// formatting only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SeriesValues {
    Integer(Vec<i64>),
    Continuous(Vec<f64>),
}

/// One named metric series shown as a timeline strip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricSeries {
    pub id: String,
    pub values: SeriesValues,
    pub max: f64,
}

impl MetricSeries {
    fn from_samples(id: &str, samples: &[f64]) -> Self {
        let head = samples.len().min(CLASSIFY_SAMPLES);
        let integer_valued = samples[..head].iter().all(|v| v.fract() == 0.0);

        let mut max = 0.0_f64;
        for &v in samples {
            max = max.max(v);
        }

        let values = if integer_valued {
            SeriesValues::Integer(samples.iter().map(|&v| v as i64).collect())
        } else {
            SeriesValues::Continuous(samples.to_vec())
        };
        Self {
            id: id.to_string(),
            values,
            max,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.values, SeriesValues::Integer(_))
    }

    pub fn len(&self) -> usize {
        match &self.values {
            SeriesValues::Integer(v) => v.len(),
            SeriesValues::Continuous(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_at(&self, step: usize) -> f64 {
        match &self.values {
            SeriesValues::Integer(v) => v.get(step).copied().unwrap_or(0) as f64,
            SeriesValues::Continuous(v) => v.get(step).copied().unwrap_or(0.0),
        }
    }

    /// Tick/callout label for the value at `step`.
    pub fn format_at(&self, step: usize) -> String {
        match &self.values {
            SeriesValues::Integer(v) => v.get(step).copied().unwrap_or(0).to_string(),
            SeriesValues::Continuous(v) => {
                format!("{:.3}", v.get(step).copied().unwrap_or(0.0))
            }
        }
    }
}

/// Transient callout shown at the preview cursor.
#[derive(Clone, Debug)]
pub struct Callout {
    pub metric: String,
    pub value: f64,
    pub label: String,
}

/// Selects and commits the active step.
#[derive(Debug)]
pub struct TimelineController {
    series: Vec<MetricSeries>,
    step_count: usize,
    preview: usize,
    pinned: usize,
    scale: LinearScale,
}

impl TimelineController {
    /// Build from the ordered per-step metric records. With no configured
    /// default step, the most fragmented partition wins: the step
    /// minimizing `rel_max_size`, ties broken by lowest index.
    pub fn new(
        records: &[StepRecord],
        default_step: Option<usize>,
        chart_width: f64,
    ) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::NoSteps);
        }
        let step_count = records.len();

        let mut series = Vec::new();
        let keys: Vec<String> = records[0].values.keys().cloned().collect();
        let mut samples: IndexMap<&str, Vec<f64>> = keys
            .iter()
            .map(|k| (k.as_str(), Vec::with_capacity(step_count)))
            .collect();
        for record in records {
            for (key, column) in samples.iter_mut() {
                column.push(record.values.get(*key).copied().unwrap_or_default());
            }
        }
        for (key, column) in &samples {
            series.push(MetricSeries::from_samples(key, column));
        }

        let default = match default_step {
            Some(step) => {
                if step >= step_count {
                    return Err(DataError::StepOutOfRange { step, step_count });
                }
                step
            }
            None => {
                let mut best = 0;
                let mut lowest = f64::INFINITY;
                for (i, record) in records.iter().enumerate() {
                    // A record missing the ratio never wins the scan.
                    let ratio = record.rel_max_size().unwrap_or(f64::INFINITY);
                    if ratio < lowest {
                        lowest = ratio;
                        best = i;
                    }
                }
                best
            }
        };
        info!("timeline: {step_count} steps, default step {default}");

        Ok(Self {
            series,
            step_count,
            preview: default,
            pinned: default,
            scale: LinearScale::new((0.0, step_count as f64), (0.0, chart_width)),
        })
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn pinned(&self) -> usize {
        self.pinned
    }

    pub fn preview(&self) -> usize {
        self.preview
    }

    pub fn series(&self) -> &[MetricSeries] {
        &self.series
    }

    /// Nearest step for a pointer x-position, clamped to the step range.
    pub fn step_at(&self, x: f64) -> usize {
        nearest_step(&self.scale, x, self.step_count)
    }

    /// Chart x-position of a step's cursor line.
    pub fn cursor_x(&self, step: usize) -> f64 {
        self.scale.apply(step as f64)
    }

    /// Pointer moved over the chart: update the preview cursor only.
    /// Subscribers are not notified; callouts are for the renderer.
    pub fn preview_at(&mut self, x: f64) -> usize {
        self.preview = self.step_at(x);
        self.preview
    }

    /// Pointer left the chart: preview snaps back to the pinned cursor,
    /// silently.
    pub fn pointer_leave(&mut self) {
        self.preview = self.pinned;
    }

    /// Click at a pointer x-position: commit the nearest step.
    pub fn commit_at(&mut self, x: f64) -> usize {
        let step = self.step_at(x);
        self.pin_unchecked(step);
        step
    }

    /// Programmatic pin.
    pub fn pin(&mut self, step: usize) -> Result<usize, DataError> {
        if step >= self.step_count {
            return Err(DataError::StepOutOfRange {
                step,
                step_count: self.step_count,
            });
        }
        self.pin_unchecked(step);
        Ok(step)
    }

    fn pin_unchecked(&mut self, step: usize) {
        debug!("timeline pin: {} -> {}", self.pinned, step);
        self.pinned = step;
        self.preview = step;
    }

    /// Per-metric values at the preview cursor.
    pub fn callouts(&self) -> Vec<Callout> {
        self.series
            .iter()
            .map(|s| Callout {
                metric: s.id.clone(),
                value: s.value_at(self.preview),
                label: s.format_at(self.preview),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn records(ratios: &[f64]) -> Vec<StepRecord> {
        ratios
            .iter()
            .enumerate()
            .map(|(index, &r)| {
                let mut values = IndexMap::new();
                values.insert(StepRecord::REL_MAX_SIZE.to_string(), r);
                values.insert("n_subgraphs".to_string(), (index + 1) as f64);
                StepRecord { index, values }
            })
            .collect()
    }

    #[test]
    fn default_step_minimizes_largest_subgraph_ratio() {
        let t = TimelineController::new(&records(&[0.9, 0.4, 0.7, 0.2]), None, 100.0).unwrap();
        assert_eq!(t.pinned(), 3);
        assert_eq!(t.preview(), 3);
    }

    #[test]
    fn default_step_tie_breaks_to_lowest_index() {
        let t = TimelineController::new(&records(&[0.5, 0.2, 0.2, 0.9]), None, 100.0).unwrap();
        assert_eq!(t.pinned(), 1);
    }

    #[test]
    fn configured_default_overrides_scan() {
        let t = TimelineController::new(&records(&[0.9, 0.1]), Some(0), 100.0).unwrap();
        assert_eq!(t.pinned(), 0);
        let err = TimelineController::new(&records(&[0.9, 0.1]), Some(5), 100.0).unwrap_err();
        assert!(matches!(err, DataError::StepOutOfRange { step: 5, .. }));
    }

    #[test]
    fn empty_records_are_rejected() {
        assert!(matches!(
            TimelineController::new(&[], None, 100.0),
            Err(DataError::NoSteps)
        ));
    }

    #[test]
    fn integer_series_classification() {
        let samples: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        let s = MetricSeries::from_samples("count", &samples);
        assert!(s.is_integer());
        assert_eq!(s.format_at(0), "1");
    }

    #[test]
    fn fractional_sample_classifies_continuous() {
        let mut samples: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        samples[7] = 0.5;
        let s = MetricSeries::from_samples("ratio", &samples);
        assert!(!s.is_integer());
        assert_eq!(s.format_at(7), "0.500");
    }

    #[test]
    fn classification_inspects_only_the_leading_window() {
        // Sample 16 is fractional but classification saw only the first 15.
        let mut samples: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        samples[16] = 2.5;
        let s = MetricSeries::from_samples("count", &samples);
        assert!(s.is_integer(), "storage width fixed by the leading window");
    }

    #[test]
    fn preview_does_not_touch_pinned() {
        let mut t = TimelineController::new(&records(&[0.9, 0.4, 0.7, 0.2]), None, 100.0).unwrap();
        // 4 steps over 100px: x=30 -> step 1.2 -> rounds to 1.
        assert_eq!(t.preview_at(30.0), 1);
        assert_eq!(t.preview(), 1);
        assert_eq!(t.pinned(), 3);
        t.pointer_leave();
        assert_eq!(t.preview(), 3);
    }

    #[test]
    fn commit_moves_both_cursors() {
        let mut t = TimelineController::new(&records(&[0.9, 0.4, 0.7, 0.2]), None, 100.0).unwrap();
        assert_eq!(t.commit_at(52.0), 2);
        assert_eq!(t.pinned(), 2);
        assert_eq!(t.preview(), 2);
    }

    #[test]
    fn pointer_mapping_clamps_out_of_range() {
        let t = TimelineController::new(&records(&[0.9, 0.4, 0.7, 0.2]), None, 100.0).unwrap();
        assert_eq!(t.step_at(-40.0), 0);
        assert_eq!(t.step_at(400.0), 3);
    }

    #[test]
    fn callouts_follow_the_preview_cursor() {
        let mut t = TimelineController::new(&records(&[0.9, 0.4, 0.7, 0.2]), None, 100.0).unwrap();
        t.preview_at(30.0);
        let callouts = t.callouts();
        assert_eq!(callouts.len(), 2);
        assert_eq!(callouts[0].metric, "rel_max_size");
        assert!((callouts[0].value - 0.4).abs() < 1e-12);
        assert_eq!(callouts[1].label, "2");
    }
}
