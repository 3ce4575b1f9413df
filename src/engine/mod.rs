//! Verdict resolution: softmax normalization, label resolution, tie policy.
//!
//! Two phases, always in order:
//!
//! 1. **Normalize** - [`softmax`] turns the raw logits into a
//!    [`ProbabilityDistribution`] (max-subtracted, computed in `f64`).
//! 2. **Resolve** - [`VerdictEngine::resolve`] picks the winning position
//!    according to the configured [`LabelScheme`](crate::labels::LabelScheme)
//!    variant and builds a [`Verdict`].
//!
//! | Scheme       | Classes | Tie policy                      |
//! |--------------|---------|---------------------------------|
//! | `Binary`     | 2       | exact tie resolves to position 1|
//! | `Ternary`    | 3       | first maximal position          |
//! | `Degenerate` | 1       | n/a, verdict flagged degenerate |

pub mod error;
pub mod softmax;
pub mod verdict;


pub use error::EngineError;
pub use softmax::{ProbabilityDistribution, argmax_first, argmax_last, softmax, to_percent};
pub use verdict::{Verdict, VerdictEngine};
