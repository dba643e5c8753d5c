//! Optional Tracy instrumentation.
//!
//! Enabled with the `profiling` Cargo feature. Without it every macro
//! expands to nothing.
//!
//! ```ignore
//! use redlilium_shader_binding::profiling::profile_scope;
//!
//! fn bind() {
//!     profile_scope!("bind_as_root");
//!     // ...
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{plot as tracy_plot, span};

/// Create a profiling span for the current scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Plot a value over time in Tracy.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {};
}

pub use profile_plot;
pub use profile_scope;
