/// Failures the simulation surfaces to its caller.
///
/// Everything else (out-of-range scalars, empty cells, zero density) is
/// clamped or guarded in place and never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("requested {requested} active particles but capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("failed to load target image `{name}`: {reason}")]
    ImageLoad { name: String, reason: String },

    #[error("unknown mode selector {0}")]
    UnknownMode(u32),
}

pub type Result<T> = std::result::Result<T, SimError>;
