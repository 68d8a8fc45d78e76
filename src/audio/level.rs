/// Aggregates incoming samples over a fixed 32ms window and reports RMS
/// level, the capture client's stand-in for a live preview surface.
pub struct LevelMeter {
    window_samples: usize,
    sum_sq: f32,
    count: usize,
}

impl LevelMeter {
    pub fn new(sample_rate: u32) -> Self {
        // Window size adapts to sample rate so updates stay ~32ms apart
        let window_samples = ((sample_rate as f32 * 0.032).round() as usize).max(128);
        Self {
            window_samples,
            sum_sq: 0.0,
            count: 0,
        }
    }

    /// Push one sample; returns the RMS level each time a window completes
    pub fn push(&mut self, sample: i16) -> Option<f32> {
        let normalized = (sample as f32) / (i16::MAX as f32);
        self.sum_sq += normalized * normalized;
        self.count += 1;

        if self.count < self.window_samples {
            return None;
        }

        let rms = (self.sum_sq / self.count as f32).sqrt();
        self.sum_sq = 0.0;
        self.count = 0;

        Some(rms.clamp(0.0, 1.0))
    }
}
