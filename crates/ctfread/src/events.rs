//! Well-known tracepoint names.
//!
//! Instrumentation wrappers shipped with LTTng-UST record under stable
//! tracepoint names; the constants here save consumers from spelling them
//! out. The `*` forms are wildcard patterns understood by the tracer's
//! event-enabling machinery, not event names that appear in a recording.

pub mod userspace {
    /// Every userspace tracepoint provider.
    pub const ALL: &str = "ust_*";

    /// Tracepoints added by the libc wrapper
    /// (`liblttng-ust-libc-wrapper.so`).
    pub mod libc {
        pub const ALL: &str = "ust_libc*";

        pub const MALLOC: &str = "ust_libc:malloc";
        pub const CALLOC: &str = "ust_libc:calloc";
        pub const REALLOC: &str = "ust_libc:realloc";
        pub const FREE: &str = "ust_libc:free";
        pub const MEMALIGN: &str = "ust_libc:memalign";
        pub const POSIX_MEMALIGN: &str = "ust_libc:posix_memalign";
    }

    /// Tracepoints added by the POSIX threads wrapper
    /// (`liblttng-ust-pthread-wrapper.so`).
    pub mod pthread {
        pub const ALL: &str = "ust_pthread*";

        pub const MUTEX_LOCK_REQ: &str = "ust_pthread:pthread_mutex_lock_req";
        pub const MUTEX_LOCK_ACQ: &str = "ust_pthread:pthread_mutex_lock_acq";
        pub const MUTEX_TRYLOCK: &str = "ust_pthread:pthread_mutex_trylock";
        pub const MUTEX_UNLOCK: &str = "ust_pthread:pthread_mutex_unlock";
    }
}
