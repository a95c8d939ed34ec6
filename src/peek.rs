//! Read single bytes from raw addresses.
//!
//! This is an arbitrary memory read primitive, for poking at a process from
//! a debugger or a test harness. There is no safe way to use it on an
//! address you don't already own.

/// Read the byte at `addr`.
///
/// # Safety
///
/// `addr` must be the address of a readable, initialized byte. Anything else
/// is undefined behaviour, and in practice usually a segfault.
#[must_use]
pub unsafe fn read_byte_at(addr: usize) -> u8 {
    // SAFETY: upheld by caller.
    unsafe { std::ptr::read_volatile(addr as *const u8) }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn heap_bytes() {
        let data: Vec<u8> = vec![0, 1, 0x7f, 0x80, 0xff, 42];
        let base = data.as_ptr() as usize;
        for (n, want) in data.iter().enumerate() {
            // SAFETY: inside `data`.
            let got = unsafe { read_byte_at(base + n) };
            assert_eq!(got, *want);
        }
    }

    #[test]
    fn mapped_page() {
        use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};
        let len = 4096;
        // SAFETY: anonymous mapping, not aliasing anything.
        let buf = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        assert_ne!(buf, MAP_FAILED);
        let base = buf as usize;
        // SAFETY: page is mapped read/write, and `i` is within it.
        unsafe {
            for i in (0..len).step_by(512) {
                *((base + i) as *mut u8) = (i / 512) as u8 + 100;
            }
        }
        for i in (0..len).step_by(512) {
            // SAFETY: inside the mapped page.
            let got = unsafe { read_byte_at(base + i) };
            assert_eq!(got, (i / 512) as u8 + 100);
        }
        // Untouched bytes of an anonymous mapping are zero.
        // SAFETY: inside the mapped page.
        assert_eq!(unsafe { read_byte_at(base + 1) }, 0);
        // SAFETY: mapped above, with this length.
        let rc = unsafe { libc::munmap(buf, len) };
        assert_eq!(rc, 0);
    }
}
