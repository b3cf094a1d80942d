//! Real-time scheduling for the sampling loop (Linux SCHED_FIFO + mlockall).
//!
//! Failures are logged and ignored: the dispenser still runs, only with more
//! jitter in the sampling windows.

/// Default SCHED_FIFO priority when `--rt-prio` is not given.
#[cfg(target_os = "linux")]
const DEFAULT_RT_PRIO: i32 = 50;

#[cfg(target_os = "linux")]
fn is_retryable_memlock_error(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM)
}

#[cfg(target_os = "linux")]
fn mlockall(flags: libc::c_int) -> std::io::Result<()> {
    // SAFETY: mlockall only takes flags and touches no Rust-managed memory.
    let rc = unsafe { libc::mlockall(flags) };
    if rc != 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Lock current and future pages; fall back to current pages only.
#[cfg(target_os = "linux")]
fn lock_memory() -> eyre::Result<()> {
    let err = match mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if is_retryable_memlock_error(&err) && mlockall(libc::MCL_CURRENT).is_ok() {
        tracing::warn!(error = %err, "mlockall(current|future) failed; locked current pages only");
        return Ok(());
    }
    Err(eyre::eyre!(
        "mlockall failed: {err}; needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'"
    ))
}

/// Clamp a requested priority to what the scheduler accepts.
#[cfg(target_os = "linux")]
pub(crate) fn clamp_priority(requested: i32, min: i32, max: i32) -> i32 {
    requested.clamp(min, max)
}

#[cfg(target_os = "linux")]
fn set_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
    use libc::{SCHED_FIFO, sched_get_priority_max, sched_get_priority_min, sched_param};

    // SAFETY: plain queries with a constant policy.
    let (min, max) = unsafe {
        (
            sched_get_priority_min(SCHED_FIFO),
            sched_get_priority_max(SCHED_FIFO),
        )
    };
    if min < 0 || max < 0 {
        return Err(eyre::eyre!(
            "sched_get_priority_min/max failed: {}",
            std::io::Error::last_os_error()
        ));
    }
    let prio = clamp_priority(prio.unwrap_or(DEFAULT_RT_PRIO), min, max);
    let param = sched_param {
        sched_priority: prio,
    };
    // SAFETY: `param` is a valid sched_param for the lifetime of the call; pid 0 is this process.
    let rc = unsafe { libc::sched_setscheduler(0, SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(eyre::eyre!(
            "sched_setscheduler(SCHED_FIFO, {prio}) failed: {}; needs CAP_SYS_NICE or root",
            std::io::Error::last_os_error()
        ));
    }
    Ok(prio)
}

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        if let Err(e) = lock_memory() {
            tracing::warn!(error = %e, "memory locking unavailable");
        }
        match set_fifo_priority(prio) {
            Ok(applied) => tracing::info!(priority = applied, "SCHED_FIFO enabled"),
            Err(e) => tracing::warn!(error = %e, "real-time priority unavailable"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>) {
    if rt {
        tracing::warn!("--rt is only supported on Linux; continuing without it");
    }
}
