/// Three-stage heightfield reconstruction: snap, margin, directional fill
use crate::bounds::SceneBounds;
use crate::config::{ExecutionMode, PipelineConfig};
use crate::directional_fill::DirectionalFill;
use crate::error::Result;
use crate::grid::{Heightfield, SampleGrid};
use crate::margin::MarginPropagator;
use crate::progress::stage_bar;
use crate::snapper::{RaySnapper, SurfaceQuery};
use serde::{Deserialize, Serialize};

/// Cell counts per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub snapped: usize,
    pub margin_filled: usize,
    pub interpolated: usize,
    /// Cells no probe direction reached; left at zero.
    pub unfilled: usize,
}

/// Rebuilt heightfield and its stage statistics.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub heightfield: Heightfield,
    pub report: PipelineReport,
}

/// Conforms a heightfield to the path surfaces reported by a [`SurfaceQuery`].
pub struct HeightfieldPipeline {
    config: PipelineConfig,
    show_progress: bool,
}

impl HeightfieldPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Display a progress bar per stage
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Rebuild `input` against `query`; existing elevations are replaced.
    ///
    /// Configuration, bounds and dimensions are checked before any stage runs.
    pub fn run<Q>(&self, input: &Heightfield, bounds: &SceneBounds, query: &Q) -> Result<Reconstruction>
    where
        Q: SurfaceQuery + Sync + ?Sized,
    {
        self.validate(bounds)?;
        let (width, height) = (input.width(), input.height());
        let snapper = RaySnapper::new(*bounds, &self.config);

        let pb = stage_bar(height, "Snapping to path surfaces", self.show_progress);
        let snapped = snapper.snap(query, width, height, self.config.execution, &pb)?;
        pb.finish_with_message("Path heights snapped");

        Ok(self.blend(snapped))
    }

    /// Like [`run`](Self::run) for queries that cannot be shared across threads.
    ///
    /// Snapping happens on the calling thread; later stages still follow the
    /// configured execution mode.
    pub fn run_serial_query<Q>(
        &self,
        input: &Heightfield,
        bounds: &SceneBounds,
        query: &Q,
    ) -> Result<Reconstruction>
    where
        Q: SurfaceQuery + ?Sized,
    {
        self.validate(bounds)?;
        let (width, height) = (input.width(), input.height());
        let snapper = RaySnapper::new(*bounds, &self.config);

        let pb = stage_bar(height, "Snapping to path surfaces", self.show_progress);
        let snapped = snapper.snap_serial(query, width, height, &pb)?;
        pb.finish_with_message("Path heights snapped");

        Ok(self.blend(snapped))
    }

    /// Margin and fill stages, each reading the previous stage's settled snapshot
    pub fn blend(&self, snapped: SampleGrid) -> Reconstruction {
        let execution = self.config.execution;
        let rows = snapped.height();
        let snapped_count = snapped.determined_count();
        log::info!(
            "Snapped {} of {} cells to path surfaces",
            snapped_count,
            snapped.len()
        );

        let mut working = snapped;
        let reference = working.snapshot();

        let pb = stage_bar(rows, "Propagating path margins", self.show_progress);
        let margin_filled = MarginPropagator::new(
            self.config.margin_radius,
            self.config.margin_height_multiplier,
        )
        .propagate(&reference, &mut working, execution, &pb);
        pb.finish_with_message("Margins applied");
        log::info!(
            "Margin of {} cells filled {} cells",
            self.config.margin_radius,
            margin_filled
        );

        let reference = working.snapshot();

        let pb = stage_bar(rows, "Interpolating remaining terrain", self.show_progress);
        let outcome = DirectionalFill.fill(&reference, &mut working, execution, &pb);
        pb.finish_with_message("Terrain interpolated");
        log::info!("Interpolated {} cells", outcome.filled);

        if outcome.unreachable > 0 {
            log::warn!(
                "{} cells could not be reached from any determined sample and were left at 0",
                outcome.unreachable
            );
        }

        Reconstruction {
            heightfield: working.to_heightfield(0.0),
            report: PipelineReport {
                snapped: snapped_count,
                margin_filled,
                interpolated: outcome.filled,
                unfilled: outcome.unreachable,
            },
        }
    }

    fn validate(&self, bounds: &SceneBounds) -> Result<()> {
        self.config.validate()?;
        bounds.validate()?;
        log::debug!(
            "Pipeline config: {:?}, {} execution",
            self.config,
            match self.config.execution {
                ExecutionMode::Parallel => "parallel",
                ExecutionMode::Serial => "serial",
            }
        );
        Ok(())
    }
}
