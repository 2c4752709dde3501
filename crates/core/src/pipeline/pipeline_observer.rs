use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for pipeline orchestration events.
///
/// Decouples the loops from specific output mechanisms (stdout, log crate,
/// a future GUI) so callers can watch pipeline behavior without changing
/// the orchestration code.
pub trait PipelineObserver: Send {
    /// Report the outcome of one presentation cycle. `ran` is false on
    /// cycles where the frame-skip gate suppressed detection.
    fn cycle(&mut self, cycle: u64, ran: bool, detections: usize);

    /// Record how long a named pipeline stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent observer that discards all events.
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn cycle(&mut self, _cycle: u64, _ran: bool, _detections: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented observer that tracks per-stage timing and detection counts
/// and provides a summary report when the run finishes.
///
/// Cycle output is throttled to every `throttle_cycles` cycles to avoid
/// flooding the terminal on fast sources.
pub struct StdoutObserver {
    throttle_cycles: u64,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    cycles_seen: u64,
    cycles_evaluated: u64,
    detections_total: u64,
    messages: Vec<String>,
}

impl StdoutObserver {
    pub fn new(throttle_cycles: u64) -> Self {
        Self {
            throttle_cycles: throttle_cycles.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            cycles_seen: 0,
            cycles_evaluated: 0,
            detections_total: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no cycles ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.cycles_seen == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = Vec::new();

        lines.push(format!(
            "Watch summary ({} cycles, {} evaluated, {} detections, {:.1}s total):",
            self.cycles_seen,
            self.cycles_evaluated,
            self.detections_total,
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if self.cycles_seen > 0 && elapsed_ms > 0.0 {
            let cps = self.cycles_seen as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {cps:.1} cycles/s"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn detections_total(&self) -> u64 {
        self.detections_total
    }
}

impl Default for StdoutObserver {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineObserver for StdoutObserver {
    fn cycle(&mut self, cycle: u64, ran: bool, detections: usize) {
        self.cycles_seen += 1;
        if ran {
            self.cycles_evaluated += 1;
            self.detections_total += detections as u64;
            if cycle % self.throttle_cycles == 0 {
                log::info!("Cycle {cycle}: {detections} detections");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
