//! Tracing hooks that vanish when the `tracing` feature is off.
//!
//! The matching hot path reports per-target and per-scale results through
//! `trace_span!` and `trace_event!`. Front ends that want the detail enable
//! the feature and install a subscriber.

#[cfg(feature = "tracing")]
mod imp {
    /// Info-level span around a matching stage.
    macro_rules! trace_span {
        ($name:expr $(, $($field:tt)*)?) => {
            tracing::info_span!($name $(, $($field)*)?)
        };
    }

    /// Debug-level event with at least one structured field.
    macro_rules! trace_event {
        ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
            tracing::debug!(name: $name, $($key = $value),+)
        };
    }

    pub(crate) use trace_event;
    pub(crate) use trace_span;
}

#[cfg(not(feature = "tracing"))]
mod imp {
    macro_rules! trace_span {
        ($name:expr $(, $($field:tt)*)?) => {
            $crate::trace::NoopSpan
        };
    }

    // Fields are borrowed so call sites see the same uses either way.
    macro_rules! trace_event {
        ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {{
            $(let _ = &$value;)+
        }};
    }

    pub(crate) use trace_event;
    pub(crate) use trace_span;
}

pub(crate) use imp::{trace_event, trace_span};

/// Span stand-in when tracing is compiled out; `entered()` is the only
/// method call sites use.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
