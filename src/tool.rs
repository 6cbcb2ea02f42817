use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, instrument, warn};

use crate::analysis::{AnalysisConfig, AnalysisReport, StagnantInterval, StagnationAnalyzer};
use crate::config::Configuration;
use crate::error::AnalysisError;
use crate::host::{MarkerSink, SceneHost, TransactionScope};
use crate::markers::MarkerColor;

const ANALYZE_SCOPE: &str = "Analyze timing";
const CLEAR_SCOPE: &str = "Clear timing markers";

/// The timing tool: analyzes the selection and manages its markers on a host.
///
/// Both operations take `&mut self`, so one invocation always finishes before
/// the next can start.
pub struct TimingTool<H: SceneHost> {
    host: H,
    rng: StdRng,
}

impl<H: SceneHost> TimingTool<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Marker colors become reproducible for a given seed.
    pub fn with_seed(host: H, seed: u64) -> Self {
        Self {
            host,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_configuration(host: H, configuration: &Configuration) -> Self {
        match configuration.color_seed {
            Some(seed) => Self::with_seed(host, seed),
            None => Self::new(host),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Finds stagnant intervals of the selection over the playback range and
    /// replaces all markers with one marker per interval.
    ///
    /// An empty selection is reported before anything on the host changes.
    /// Any other failure rolls the host back to its state before the call.
    #[instrument(skip(self))]
    pub fn analyze(&mut self, threshold: f64) -> Result<AnalysisReport, AnalysisError> {
        let entities = self.host.selection();
        if entities.is_empty() {
            warn!("{}", AnalysisError::EmptySelection);
            return Err(AnalysisError::EmptySelection);
        }

        let config = AnalysisConfig::new(threshold, self.host.playback_range(), entities)?;
        if !config.threshold().is_practical() {
            warn!(
                "Threshold {} is outside the usual range of 0.01 to 10.0",
                threshold
            );
        }

        let result = self.analyze_in_scope(&config);
        match &result {
            Ok(report) => info!(
                "Created {} timing markers over {}",
                report.intervals.len(),
                report.range
            ),
            Err(e) => error!("Timing analysis failed, changes rolled back: {}", e),
        }
        result
    }

    fn analyze_in_scope(
        &mut self,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.host
            .ensure_marker_support()
            .map_err(AnalysisError::Sink)?;

        let mut scope = TransactionScope::open(&mut self.host, ANALYZE_SCOPE)
            .map_err(AnalysisError::Transaction)?;

        let report = StagnationAnalyzer::new(config).run(&mut *scope)?;
        replace_markers(&mut *scope, &report.intervals, &mut self.rng)?;

        scope.commit().map_err(AnalysisError::Transaction)?;
        Ok(report)
    }

    /// Removes every marker in one undoable step, returning how many were removed.
    /// Does nothing when there are no markers.
    pub fn clear_markers(&mut self) -> Result<usize, AnalysisError> {
        if self.host.markers().is_empty() {
            debug!("No timing markers to clear");
            return Ok(0);
        }

        let mut scope = TransactionScope::open(&mut self.host, CLEAR_SCOPE)
            .map_err(AnalysisError::Transaction)?;
        let removed = scope.clear_all_markers().map_err(AnalysisError::Sink)?;
        scope.commit().map_err(AnalysisError::Transaction)?;

        info!("Cleared {} timing markers", removed);
        Ok(removed)
    }
}

/// Clears the sink completely, then writes one randomly colored marker per interval.
fn replace_markers<S, R>(
    sink: &mut S,
    intervals: &[StagnantInterval],
    rng: &mut R,
) -> Result<(), AnalysisError>
where
    S: MarkerSink + ?Sized,
    R: rand::Rng,
{
    let removed = sink.clear_all_markers().map_err(AnalysisError::Sink)?;
    debug!("Removed {} previous timing markers", removed);

    for interval in intervals {
        let color = MarkerColor::random(rng);
        sink.create_marker(*interval, color)
            .map_err(AnalysisError::Sink)?;
    }
    Ok(())
}
