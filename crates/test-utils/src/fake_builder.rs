use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use specwatch::build::{
    BuildFuture, BuildOptions, Document, DocumentBuilder, Fetch, GeneratedAsset,
};
use specwatch::errors::BuildError;

#[derive(Debug, Clone)]
enum Behaviour {
    /// Fetch the entry and return its content unchanged.
    Echo,
    /// Always return this document.
    Fixed(String),
    /// Always fail.
    Fail,
    /// Panic on the next build, then echo.
    PanicOnce,
}

/// A fake document builder that:
/// - counts invocations (and how many overlapped)
/// - echoes the entry, returns a fixed document, fails, or panics once
/// - optionally sleeps to simulate a slow build.
#[derive(Debug, Clone)]
pub struct FakeBuilder {
    behaviour: Arc<Mutex<Behaviour>>,
    assets: Vec<GeneratedAsset>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeBuilder {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour: Arc::new(Mutex::new(behaviour)),
            assets: Vec::new(),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn echo() -> Self {
        Self::with_behaviour(Behaviour::Echo)
    }

    pub fn fixed(html: &str) -> Self {
        Self::with_behaviour(Behaviour::Fixed(html.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_behaviour(Behaviour::Fail)
    }

    /// Panics during its first build and echoes afterwards.
    pub fn panic_once() -> Self {
        Self::with_behaviour(Behaviour::PanicOnce)
    }

    pub fn with_asset(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.assets.push(GeneratedAsset {
            path: path.into(),
            contents: contents.to_string(),
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Switch between failing and echoing for later builds.
    pub fn set_failing(&self, failing: bool) {
        let mut behaviour = self.behaviour.lock().unwrap();
        *behaviour = if failing { Behaviour::Fail } else { Behaviour::Echo };
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of builds that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, entry: &Path, fetch: &dyn Fetch) -> Result<Document, BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let behaviour = self.behaviour.lock().unwrap().clone();
        if let Behaviour::PanicOnce = behaviour {
            *self.behaviour.lock().unwrap() = Behaviour::Echo;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("fake builder panic");
        }
        let result = match behaviour {
            Behaviour::Echo => {
                let name = entry.to_string_lossy();
                fetch
                    .fetch(&name)
                    .map(|html| Document::new(html, self.assets.clone()))
                    .map_err(|source| BuildError::Fetch {
                        name: name.into_owned(),
                        source,
                    })
            }
            Behaviour::Fixed(html) => Ok(Document::new(html, self.assets.clone())),
            Behaviour::Fail | Behaviour::PanicOnce => Err(BuildError::CommandFailed {
                code: 1,
                stderr: "fake build failure".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl DocumentBuilder for FakeBuilder {
    fn build<'a>(
        &'a self,
        entry: &'a Path,
        fetch: &'a dyn Fetch,
        _options: &'a BuildOptions,
    ) -> BuildFuture<'a> {
        Box::pin(self.run(entry, fetch))
    }
}
