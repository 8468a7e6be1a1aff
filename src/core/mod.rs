//! Core form derivations, records and backend abstractions

pub mod backend;
pub mod cache;
pub mod config;
pub mod derivation;
pub mod forms;
pub mod log;
pub mod model;
pub mod money;
pub mod status;

// Re-export main types for cleaner imports
pub use backend::MandateSource;
pub use derivation::{
    BoundedDateRange, DateRange, RangeError, RangeRules, compute_duration, validate_range,
};
pub use forms::{Form, FormContext, FormError};
pub use money::{MonetaryDecomposition, decompose};
pub use status::{MandateStatus, MissionOrderStatus};
