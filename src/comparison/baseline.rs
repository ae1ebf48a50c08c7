//! @ai:module:intent Choose the baseline run for relative comparison
//! @ai:module:layer application
//! @ai:module:public_api BaselineSelection, BaselineSource, select_baseline
//! @ai:module:stateless true

/// @ai:intent How the baseline run was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineSource {
    Configured,
    /// Nothing configured; the earliest run was taken.
    Inferred,
    /// The configured run was not found; the earliest run was taken instead.
    Fallback { requested: String },
}

/// @ai:intent Selected baseline run id and its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineSelection {
    pub run_id: String,
    pub source: BaselineSource,
}

/// @ai:intent Resolve the baseline among discovered runs
/// @ai:effects pure
/// @ai:post None only when `runs` is empty
/// @ai:edge_cases unknown configured id falls back to the earliest run
pub fn select_baseline(configured: Option<&str>, runs: &[String]) -> Option<BaselineSelection> {
    let earliest = runs.iter().min()?.clone();

    let selection = match configured {
        None => BaselineSelection {
            run_id: earliest,
            source: BaselineSource::Inferred,
        },
        Some(id) if runs.iter().any(|r| r == id) => BaselineSelection {
            run_id: id.to_string(),
            source: BaselineSource::Configured,
        },
        Some(id) => BaselineSelection {
            run_id: earliest,
            source: BaselineSource::Fallback {
                requested: id.to_string(),
            },
        },
    };

    Some(selection)
}

impl BaselineSelection {
    /// @ai:intent Emit the diagnostic matching how the baseline was chosen
    /// @ai:effects io
    pub fn log(&self, runs: &[String]) {
        match &self.source {
            BaselineSource::Configured => {
                tracing::info!("Using configured baseline: {}", self.run_id);
            }
            BaselineSource::Inferred => {
                tracing::info!("No baseline configured, using first run as baseline: {}", self.run_id);
            }
            BaselineSource::Fallback { requested } => {
                tracing::warn!(
                    "Configured baseline run '{}' not found in available runs ({})",
                    requested,
                    runs.join(", ")
                );
                tracing::warn!("Falling back to first run as baseline: {}", self.run_id);
            }
        }
    }
}
