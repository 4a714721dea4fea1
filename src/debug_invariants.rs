//! Structural self-checks for topology containers.
//!
//! Checks run at population boundaries in debug builds, or in any build with
//! the `strict-invariants` / `check-invariants` features. Release builds
//! without those features skip them; callers can still run
//! [`DebugInvariants::validate_invariants`] explicitly, e.g. after editing
//! tables through `connectivity_mut`.

use crate::mesh_error::TopologyError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), TopologyError>;

    /// Assert invariants in debug builds or when invariant checking is enabled.
    #[track_caller]
    fn debug_assert_invariants(&self) {
        #[cfg(any(
            debug_assertions,
            feature = "strict-invariants",
            feature = "check-invariants"
        ))]
        if let Err(e) = self.validate_invariants() {
            panic!("[invariants] {}: {e}", std::any::type_name::<Self>());
        }
    }
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
