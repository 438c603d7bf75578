//! Forwarding entries for `<unistd.h>` functions.

use std::ffi::{c_int, c_void};

use premock_core::intercept;

intercept! {
    /// Redirect target for `close(2)`.
    pub unsafe extern "C" fn ut_close(fd: c_int) -> c_int {
        slot: mock_close,
        real: libc::close,
    }

    /// Redirect target for `read(2)`.
    pub unsafe extern "C" fn ut_read(fd: c_int, buf: *mut c_void, count: usize) -> isize {
        slot: mock_read,
        real: libc::read,
    }

    /// Redirect target for `write(2)`.
    pub unsafe extern "C" fn ut_write(fd: c_int, buf: *const c_void, count: usize) -> isize {
        slot: mock_write,
        real: libc::write,
    }
}
