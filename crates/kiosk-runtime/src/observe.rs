use kiosk_assets::DownloadProgress;

/// Phases of one run, in order.
///
/// `ResolvingModule`, `Downloading`, and `Compiling` are all skipped when
/// the module is already cached: a cached run goes straight to
/// `Instantiating`. `Downloading` and `Compiling` are otherwise skipped
/// together or not at all. `Running` is the only phase during which output
/// capture is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    ResolvingModule,
    Downloading,
    Compiling,
    Instantiating,
    Running,
}

impl RunPhase {
    /// Short feedback text shown while the phase is active.
    pub fn feedback(&self) -> &'static str {
        match self {
            RunPhase::ResolvingModule => "Resolving module...",
            RunPhase::Downloading => "Downloading module...",
            RunPhase::Compiling => "Compiling module...",
            RunPhase::Instantiating => "Preparing instance...",
            RunPhase::Running => "Running...",
        }
    }
}

/// Boundary for surfacing run progress to a front end.
///
/// Callbacks are invoked from the run's task; implementations should do no
/// more than update a display.
pub trait RunObserver: Send + Sync {
    fn on_phase(&self, _phase: RunPhase) {}

    /// Cumulative download progress, after each received chunk.
    fn on_download_progress(&self, _progress: DownloadProgress) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl RunObserver for NullObserver {}
