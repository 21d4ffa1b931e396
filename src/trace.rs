//! Optional structural tracing.
//!
//! With the `tracing` feature enabled, [`trace_event!`] forwards to
//! `tracing::trace!`. Without it the macro expands to nothing, so call sites
//! cost nothing in default builds.

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($($argument:tt)*) => {
        ::tracing::trace!(target: "avlmap", $($argument)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($($argument:tt)*) => {};
}

pub(crate) use trace_event;
