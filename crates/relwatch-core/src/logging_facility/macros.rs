//! Canonical logging macros
//!
//! Every public operation logs one `start` and exactly one of `end` /
//! `end_error`, tagged with `component` and `op`. Extra fields are passed
//! through in `tracing` syntax, usually `entity_type` plus counts.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_boundary {
    ($event:expr, $op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        );
    };
}

/// Log the start of an operation
///
/// ```
/// # use relwatch_core::log_op_start;
/// log_op_start!("detect");
/// log_op_start!("detect", entity_type = "obsidian-plugin", old_len = 3usize);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_boundary!(
            relwatch_core_types::schema::EVENT_START,
            $op
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is mandatory
///
/// ```
/// # use relwatch_core::log_op_end;
/// log_op_end!("detect", duration_ms = 3u64, change_count = 0usize);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_boundary!(
            relwatch_core_types::schema::EVENT_END,
            $op,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log the failed end of an operation
///
/// `$err` is anything convertible into `ExError`. The error's stable code and
/// kind are logged, plus the failing entity id when the error carries one.
///
/// ```
/// # use relwatch_core::{log_op_error, errors::RelwatchError};
/// let err = RelwatchError::UnknownEntityType { entity_type: "x".to_string() };
/// log_op_error!("registry_get", err, duration_ms = 0u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = relwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.entity_id = ex_err.entity_id(),
            $($($field)*)?
        );
    }};
}
