// @module: Progress reporting seam

/// Receives progress updates as a fraction in `[0, 1]` and a short message
pub trait ProgressReporter: Send + Sync {
    fn report(&self, fraction: f32, message: &str);
}

/// Discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f32, _message: &str) {}
}

/// Maps a sub-task's `[0, 1]` range onto `[start, start + span]` of a parent reporter
pub struct ScaledProgress<'a> {
    inner: &'a dyn ProgressReporter,
    start: f32,
    span: f32,
}

impl<'a> ScaledProgress<'a> {
    pub fn new(inner: &'a dyn ProgressReporter, start: f32, end: f32) -> Self {
        Self {
            inner,
            start,
            span: (end - start).max(0.0),
        }
    }
}

impl ProgressReporter for ScaledProgress<'_> {
    fn report(&self, fraction: f32, message: &str) {
        let fraction = fraction.clamp(0.0, 1.0);
        self.inner.report(self.start + fraction * self.span, message);
    }
}
