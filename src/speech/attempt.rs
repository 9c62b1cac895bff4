// @module: Retry state for one caption's synthesis

// @const: Appended to text shortened before the final attempt
pub const TRUNCATION_MARKER: &str = "...";

/// What the next synthesis attempt sends.
///
/// Transitions happen only on failure. The final attempt of a long caption
/// is made with the text shortened and the slow rate forced, which is the
/// variant the service is most likely to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    /// 1-based attempt number
    pub attempt: u32,
    /// Text sent on this attempt
    pub text: String,
    /// Reduced speaking rate on this attempt
    pub slow: bool,
}

/// Limits that drive the transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    pub max_attempts: u32,
    pub truncate_threshold_chars: usize,
}

impl AttemptState {
    pub fn first(text: &str, slow: bool) -> Self {
        Self {
            attempt: 1,
            text: text.to_string(),
            slow,
        }
    }

    /// State after this attempt failed, or `None` when attempts are exhausted
    pub fn after_failure(&self, policy: &AttemptPolicy) -> Option<Self> {
        let next_attempt = self.attempt + 1;
        if next_attempt > policy.max_attempts {
            return None;
        }

        let mut next = Self {
            attempt: next_attempt,
            text: self.text.clone(),
            slow: self.slow,
        };

        let is_final = next_attempt == policy.max_attempts;
        if is_final && self.text.chars().count() > policy.truncate_threshold_chars {
            next.text = shorten(&self.text, policy.truncate_threshold_chars);
            next.slow = true;
        }

        Some(next)
    }

    pub fn is_last(&self, policy: &AttemptPolicy) -> bool {
        self.attempt >= policy.max_attempts
    }
}

/// First `max_chars` characters followed by the truncation marker
pub fn shorten(text: &str, max_chars: usize) -> String {
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push_str(TRUNCATION_MARKER);
    shortened
}
