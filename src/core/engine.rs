use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ScoringEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ScoringEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting batch scoring...");

        // Extract
        let raw = self.pipeline.extract()?;
        tracing::info!("📥 Extracted {} rows ({:?})", raw.len(), started.elapsed());

        // Transform
        let result = self.pipeline.transform(raw)?;
        tracing::info!(
            "🧮 Scored {} rows, rejected {} ({:?})",
            result.scored.len(),
            result.rejected.len(),
            started.elapsed()
        );

        // Load
        let output_path = self.pipeline.load(result)?;
        tracing::info!("💾 Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
