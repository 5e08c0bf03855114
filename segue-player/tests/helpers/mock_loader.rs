//! Scripted AudioLoader test double
//!
//! Every URL succeeds with a silent buffer (180s by default, 100 Hz mono to
//! keep memory small) unless the test scripts otherwise.

use async_trait::async_trait;
use segue_player::audio::{AudioLoader, DecodedBuffer};
use segue_player::error::{LoadError, LoadErrorKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_SAMPLE_RATE: u32 = 100;

#[derive(Default)]
struct Script {
    duration: Option<f64>,
    /// Failures returned before the first success
    failures: Vec<LoadErrorKind>,
    always_fail: Option<LoadErrorKind>,
    delay: Option<Duration>,
}

pub struct MockLoader {
    default_duration: f64,
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

impl MockLoader {
    pub fn new() -> Arc<Self> {
        Self::with_default_duration(180.0)
    }

    pub fn with_default_duration(seconds: f64) -> Arc<Self> {
        Arc::new(Self {
            default_duration: seconds,
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn script<F: FnOnce(&mut Script)>(&self, url: &str, f: F) {
        let mut scripts = self.scripts.lock().unwrap();
        f(scripts.entry(url.to_string()).or_default());
    }

    pub fn set_duration(&self, url: &str, seconds: f64) {
        self.script(url, |s| s.duration = Some(seconds));
    }

    /// Fail the next `times` loads of `url` with `kind`, then succeed
    pub fn fail_times(&self, url: &str, times: usize, kind: LoadErrorKind) {
        self.script(url, |s| s.failures = vec![kind; times]);
    }

    pub fn fail_always(&self, url: &str, kind: LoadErrorKind) {
        self.script(url, |s| s.always_fail = Some(kind));
    }

    pub fn set_delay(&self, url: &str, delay: Duration) {
        self.script(url, |s| s.delay = Some(delay));
    }

    pub fn load_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_loads(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn error_of(kind: LoadErrorKind, url: &str) -> LoadError {
    LoadError {
        kind,
        message: format!("scripted failure for {}", url),
    }
}

#[async_trait]
impl AudioLoader for MockLoader {
    async fn load(&self, url: &str) -> Result<Arc<DecodedBuffer>, LoadError> {
        self.calls.lock().unwrap().push(url.to_string());

        let (delay, outcome) = {
            let mut scripts = self.scripts.lock().unwrap();
            let script = scripts.entry(url.to_string()).or_default();
            let outcome = if let Some(kind) = script.always_fail {
                Err(error_of(kind, url))
            } else if !script.failures.is_empty() {
                Err(error_of(script.failures.remove(0), url))
            } else {
                Ok(script.duration.unwrap_or(self.default_duration))
            };
            (script.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let duration = outcome?;
        Ok(Arc::new(DecodedBuffer::silence(duration, MOCK_SAMPLE_RATE, 1)))
    }
}
