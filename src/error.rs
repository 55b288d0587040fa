use thiserror::Error;

use crate::as_graph::ASN;

/// Errors raised by the simulation core.
///
/// `InvariantViolation` and `ConfigError` are returned as `Err` and abort the
/// trial. `ConvergenceWarning` and `TracebackCycle` are logged via
/// `log::warn!` at the call site and folded into the outcome instead of being
/// propagated as `Err` — see the call sites in `scheduler.rs` and
/// `analyzer.rs`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invariant violation in AS {asn}: {detail}")]
    InvariantViolation { asn: ASN, detail: String },

    #[error("scenario config error: {0}")]
    ConfigError(String),

    #[error("sweep hit the iteration cap ({rounds} rounds) without converging")]
    ConvergenceWarning { rounds: u32 },

    #[error("traceback revisited AS {asn} while its outcome was still UNDETERMINED")]
    TracebackCycle { asn: ASN },
}

pub type SimResult<T> = Result<T, SimError>;

/// Topology-construction errors, surfaced separately from `SimError` since
/// they arise before any engine exists (during `ASGraph` ingestion).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("AS {0} lists itself as its own provider or customer")]
    SelfLoop(ASN),
}

