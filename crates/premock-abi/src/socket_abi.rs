//! Forwarding entries for `<sys/socket.h>` functions.

use std::ffi::{c_int, c_void};

use premock_core::intercept;

intercept! {
    /// Redirect target for `socket(2)`.
    pub unsafe extern "C" fn ut_socket(domain: c_int, sock_type: c_int, protocol: c_int) -> c_int {
        slot: mock_socket,
        real: libc::socket,
    }

    /// Redirect target for `connect(2)`.
    pub unsafe extern "C" fn ut_connect(
        sockfd: c_int,
        addr: *const libc::sockaddr,
        addrlen: libc::socklen_t,
    ) -> c_int {
        slot: mock_connect,
        real: libc::connect,
    }

    /// Redirect target for `send(2)`.
    pub unsafe extern "C" fn ut_send(sockfd: c_int, buf: *const c_void, len: usize, flags: c_int) -> isize {
        slot: mock_send,
        real: libc::send,
    }

    /// Redirect target for `recv(2)`.
    pub unsafe extern "C" fn ut_recv(sockfd: c_int, buf: *mut c_void, len: usize, flags: c_int) -> isize {
        slot: mock_recv,
        real: libc::recv,
    }
}
