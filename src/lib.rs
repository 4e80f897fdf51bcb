//! Peak detection and quantification for 1-D spectral data.
//!
//! Given a sampled (x, y) spectrum — cross-section vs. energy, count rate
//! vs. time-of-flight — the engine enumerates local maxima, bounds each one
//! by derivative-decay analysis against an estimated background slope,
//! computes shape metrics (integral, width, height, FWHM, two shape
//! ratios), and ranks every metric deterministically.
//!
//! ```
//! use spectral_peaks::{build_peak_set, PeakParams, Spectrum, SubstanceData};
//!
//! let y = vec![0.0, 0.0, 0.0, 0.0, 1.0, 4.0, 10.0, 4.0, 1.0, 0.0, 0.0, 0.0, 0.0];
//! let x = (0..y.len()).map(|i| i as f64).collect();
//! let params = PeakParams {
//!     max_half_width: 10,
//!     box_density: 1.0,
//!     slope_drop: 0.2,
//!     derivative_smoothing: 1,
//!     ..Default::default()
//! };
//! let data = SubstanceData::new("demo", Spectrum::new(x, y)?, &params)?;
//!
//! let (peaks, log) = build_peak_set(&data, &params);
//! assert_eq!(peaks.len(), 1);
//! assert!(log.is_empty());
//! # Ok::<(), spectral_peaks::AnalysisError>(())
//! ```
//!
//! Per-peak failures never abort an analysis: the affected peak keeps
//! sentinel values and the cause is accumulated in an [`AnalysisLog`].
//! Batches across substances run in parallel via [`batch::analyze_all`].

pub mod batch;
pub mod engine;
pub mod error;
pub mod model;
pub mod params;

pub use batch::{analyze_all, closest_peaks, SubstanceResult};
pub use engine::{build_peak_set, rebuild_with_overrides};
pub use error::{AnalysisError, AnalysisLog, LogEntry};
pub use model::{
    BoundaryReason, Derivatives, Peak, PeakBoundaries, PeakRanks, PeakSet, Spectrum,
    SubstanceData,
};
pub use params::PeakParams;
