//! Incremental progress reporting for the extraction pipeline.
//!
//! Reported as `{stage, percent}` events. When AI and OCR both run, their
//! sub-phases are partitioned across the percent range (AI 0-60, OCR
//! 60-100) so a caller can render one continuous progress indicator.

use serde::{Deserialize, Serialize};

/// One progress tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: String,
    pub percent: u8,
}

/// Receiver for progress events. The embedding UI implements this to drive
/// its progress bar; tests collect events into a `Vec`.
pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

/// Sink that discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Sink collecting events for assertions.
#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for CollectSink {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// A sub-range of the overall percent scale.
///
/// `report(stage, fraction)` maps `fraction ∈ [0, 1]` of this span onto the
/// global percent range, so a sub-phase never needs to know where it sits in
/// the overall pipeline.
pub struct ProgressSpan<'a> {
    sink: &'a mut dyn ProgressSink,
    start: f32,
    end: f32,
}

impl<'a> ProgressSpan<'a> {
    /// Span covering the whole 0-100 range.
    pub fn full(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            start: 0.0,
            end: 100.0,
        }
    }

    /// Span covering `[start, end]` percent of the overall scale.
    pub fn range(sink: &'a mut dyn ProgressSink, start: f32, end: f32) -> Self {
        Self { sink, start, end }
    }

    /// Report `fraction` (clamped to `[0, 1]`) of this span as done.
    pub fn report(&mut self, stage: &str, fraction: f32) {
        let fraction = fraction.clamp(0.0, 1.0);
        let percent = self.start + (self.end - self.start) * fraction;
        self.sink.report(ProgressEvent {
            stage: stage.to_string(),
            percent: percent.round() as u8,
        });
    }

    /// A nested sub-span over `[from, to]` fractions of this span.
    pub fn sub(&mut self, from: f32, to: f32) -> ProgressSpan<'_> {
        let width = self.end - self.start;
        ProgressSpan {
            start: self.start + width * from,
            end: self.start + width * to,
            sink: self.sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_span_maps_fraction_to_percent() {
        let mut sink = CollectSink::default();
        let mut span = ProgressSpan::full(&mut sink);
        span.report("ocr", 0.0);
        span.report("ocr", 0.5);
        span.report("ocr", 1.0);
        let percents: Vec<u8> = sink.events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![0, 50, 100]);
    }

    #[test]
    fn partitioned_spans_form_one_continuous_scale() {
        let mut sink = CollectSink::default();
        {
            let mut ai = ProgressSpan::range(&mut sink, 0.0, 60.0);
            ai.report("ai_extraction", 0.5);
            ai.report("ai_extraction", 1.0);
        }
        {
            let mut ocr = ProgressSpan::range(&mut sink, 60.0, 100.0);
            ocr.report("ocr", 0.5);
            ocr.report("ocr", 1.0);
        }
        let percents: Vec<u8> = sink.events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![30, 60, 80, 100]);
        // Monotone non-decreasing across the whole run.
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn fraction_is_clamped() {
        let mut sink = CollectSink::default();
        let mut span = ProgressSpan::range(&mut sink, 0.0, 60.0);
        span.report("ai_extraction", 7.0);
        assert_eq!(sink.events[0].percent, 60);
    }

    #[test]
    fn sub_span_nests_correctly() {
        let mut sink = CollectSink::default();
        let mut outer = ProgressSpan::range(&mut sink, 60.0, 100.0);
        let mut inner = outer.sub(0.5, 1.0);
        inner.report("mrz_parse", 0.0);
        inner.report("mrz_parse", 1.0);
        let percents: Vec<u8> = sink.events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![80, 100]);
    }
}
