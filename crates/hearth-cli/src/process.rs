//! Process title.

/// Kernel limit for a thread name, excluding the trailing NUL.
#[cfg(target_os = "linux")]
const MAX_NAME_LEN: usize = 15;

/// Rename the running process as shown by `ps`/`top`.
///
/// Returns `false` if the platform does not support it or the call failed.
#[cfg(target_os = "linux")]
pub fn set_process_name(name: &str) -> bool {
    let mut end = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let Ok(name) = std::ffi::CString::new(&name[..end]) else {
        return false;
    };

    // SAFETY: PR_SET_NAME reads a NUL terminated string of at most 16 bytes
    // from the pointer; `name` outlives the call.
    unsafe { libc::prctl(libc::PR_SET_NAME, name.as_ptr() as libc::c_ulong, 0, 0, 0) == 0 }
}

#[cfg(not(target_os = "linux"))]
pub fn set_process_name(_name: &str) -> bool {
    false
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    fn current_name() -> String {
        std::fs::read_to_string("/proc/thread-self/comm")
            .unwrap()
            .trim_end()
            .to_string()
    }

    #[test]
    fn long_names_are_truncated() {
        // Runs on a test thread, so only that thread is renamed.
        assert!(set_process_name("hearth-worker-0123456789"));
        assert_eq!(current_name(), "hearth-worker-0");
    }

    #[test]
    fn interior_nul_is_refused() {
        assert!(!set_process_name("hea\0rth"));
    }
}
