/*!
 * Racer CPU Affinity
 */

/// Pin the calling thread to `core`; false when the platform or the kernel refuses
#[cfg(target_os = "linux")]
pub fn pin_current_thread(core: usize) -> bool {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut set = CpuSet::new();
    if set.set(core).is_err() {
        return false;
    }
    sched_setaffinity(Pid::from_raw(0), &set).is_ok()
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_core: usize) -> bool {
    false
}
