use tracing::warn;

/// Pin the calling thread to the given CPU.
///
/// Single-core mode requires both pipelines to contend for one scheduler;
/// without affinity the OS migrates them apart and the link goes deaf.
/// Failure is survivable (the link degrades to SNR loss), so this warns and
/// continues.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) {
    use std::mem;

    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);

        let result = libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set);
        if result != 0 {
            warn!(
                "failed to pin thread to cpu {}: {}",
                cpu,
                std::io::Error::last_os_error()
            );
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(cpu: usize) {
    warn!("cpu affinity is not supported on this platform (cpu {})", cpu);
}
