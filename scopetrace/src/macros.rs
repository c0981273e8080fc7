//! Scope-timing macros recording into [`Instrumentor::global`](crate::Instrumentor::global).
//!
//! With the `profiler` feature off, `profile_scope!` and `profile_function!`
//! expand to nothing and the `profile_and_log_*` family only logs.

/// Time the rest of the enclosing block.
///
/// ```
/// fn step() {
///     scopetrace::profile_scope!("step");
///     // ...
/// }
/// ```
#[cfg(feature = "profiler")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        let _scopetrace_timer =
            $crate::InstrumentationTimer::new($crate::Instrumentor::global(), $name);
    };
}

#[cfg(not(feature = "profiler"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Time the rest of the enclosing function, named by its path.
#[macro_export]
macro_rules! profile_function {
    () => {
        $crate::profile_scope!($crate::__function_name!());
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __scopetrace_here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(__scopetrace_here);
        name.strip_suffix("::__scopetrace_here").unwrap_or(name)
    }};
}

/// Log `name` at info level, then time the rest of the enclosing block.
#[macro_export]
macro_rules! profile_and_log_info {
    ($name:expr) => {
        let _scopetrace_name = $name;
        $crate::__log::info!("{}", _scopetrace_name);
        $crate::profile_scope!(_scopetrace_name);
    };
}

/// Log `name` at warn level, then time the rest of the enclosing block.
#[macro_export]
macro_rules! profile_and_log_warn {
    ($name:expr) => {
        let _scopetrace_name = $name;
        $crate::__log::warn!("{}", _scopetrace_name);
        $crate::profile_scope!(_scopetrace_name);
    };
}

/// Log `name` at error level, then time the rest of the enclosing block.
#[macro_export]
macro_rules! profile_and_log_error {
    ($name:expr) => {
        let _scopetrace_name = $name;
        $crate::__log::error!("{}", _scopetrace_name);
        $crate::profile_scope!(_scopetrace_name);
    };
}
