use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

const ID_PREFIX: &str = "job_";

/// Width of a u64 rendered in base 36.
const RANDOM_WIDTH: usize = 13;

/// Generates opaque job tokens of the form `job_<random><counter>`.
///
/// The random part is fixed width, so the counter suffix alone keeps ids
/// from one generator distinct even when the entropy source is unavailable.
pub struct JobIdGenerator {
    counter: AtomicU64,
    entropy: fn() -> Option<u64>,
}

impl JobIdGenerator {
    pub fn new() -> Self {
        Self::with_entropy(random_component)
    }

    /// Generator drawing its random part from `entropy`; `None` means the
    /// source failed and the timestamp is used instead.
    pub(crate) fn with_entropy(entropy: fn() -> Option<u64>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            entropy,
        }
    }

    pub fn next_id(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let random = (self.entropy)().unwrap_or_else(|| {
            tracing::warn!("OS entropy source unavailable, using timestamp for job id");
            fallback_component()
        });

        format!(
            "{ID_PREFIX}{:0>width$}{}",
            to_base36(random),
            to_base36(count),
            width = RANDOM_WIDTH
        )
    }
}

impl Default for JobIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn random_component() -> Option<u64> {
    let mut bytes = [0u8; 8];
    OsRng.try_fill_bytes(&mut bytes).ok()?;
    Some(u64::from_le_bytes(bytes))
}

fn fallback_component() -> u64 {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    nanos.unsigned_abs()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(RANDOM_WIDTH);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
