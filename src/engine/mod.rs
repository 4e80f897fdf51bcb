/// Analysis pipeline: from raw samples to a ranked peak set.
///
/// Architecture:
/// ```text
///   Spectrum + Derivatives + maxima
///          │
///          ▼
///   ┌────────────┐
///   │  builder    │  one candidate per maximum, neighborhood half-widths
///   └────────────┘
///          │  per candidate
///          ▼
///   ┌────────────┐     ┌─────────────┐
///   │  boundary   │ ──▶ │  histogram   │  outer-slope estimate
///   └────────────┘     └─────────────┘
///          │
///          ▼
///   ┌────────────┐
///   │  quantify   │  integral, width, height, FWHM, shape ratios
///   └────────────┘
///          │  all candidates
///          ▼
///   ┌────────────┐
///   │   rank      │  six descending rankings, re-key by integral
///   └────────────┘
/// ```
///
/// `array_ops` and `histogram` are the shared numeric leaves; `background`
/// estimates peak-free baselines for count spectra.
pub mod array_ops;
pub mod background;
pub mod boundary;
pub mod builder;
pub mod histogram;
pub mod quantify;
pub mod rank;

pub use boundary::find_boundaries;
pub use builder::{build_peak_set, rebuild_with_overrides};
pub use quantify::{fwhm, integrate};
