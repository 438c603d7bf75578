//! Integration tests for the socket and unistd forwarding entries.

use std::ffi::{c_int, c_void};
use std::ptr;

use premock_abi::socket_abi::{ut_connect, ut_send, ut_socket};
use premock_abi::unistd_abi::{ut_close, ut_read, ut_write};
use premock_abi::{mock_close, mock_connect, mock_send, mock_socket};
use premock_core::{VerifyError, mock, replace};

/// Production code whose `send` call site was redirected to `ut_send`.
fn prod_send(fd: c_int) -> isize {
    let buffer: *const c_void = ptr::null();
    let length = 0;
    let flags = 0;
    // SAFETY: a null buffer with zero length is never dereferenced.
    unsafe { ut_send(fd, buffer, length, flags) }
}

fn prod_open_and_close() -> c_int {
    // SAFETY: plain syscalls with scalar arguments.
    unsafe {
        let fd = ut_socket(libc::AF_INET, libc::SOCK_STREAM, 0);
        if fd < 0 {
            return fd;
        }
        ut_close(fd)
    }
}

#[test]
fn real_send_rejects_bad_descriptor() {
    assert_eq!(prod_send(-1), -1);
}

#[test]
fn replaced_send_returns_programmed_value() {
    replace!(mock_send, |_: c_int, _: *const c_void, _: usize, _: c_int| 7);
    assert_eq!(prod_send(0), 7);
}

#[test]
fn mocked_send_records_arguments() -> Result<(), VerifyError> {
    let m = mock!(mock_send);
    m.return_value(42);
    assert_eq!(prod_send(3), 42);
    m.expect_called_once()?
        .with_values((3, ptr::null(), 0, 0))?;

    m.return_values([1, 2]);
    assert_eq!(prod_send(4), 1);
    assert_eq!(prod_send(5), 2);
    assert_eq!(prod_send(6), 2);
    m.expect_called(3)?
        .with_value_list_in([(5, ptr::null(), 0, 0), (6, ptr::null(), 0, 0)], 1..3)?;
    Ok(())
}

#[test]
fn mismatched_send_arguments_render_the_pointer() {
    let m = mock!(mock_send);
    prod_send(9);
    let err = m
        .expect_called_once()
        .and_then(|checker| checker.with_values((8, ptr::null(), 0, 0)))
        .unwrap_err();
    assert_eq!(
        err,
        VerifyError::ValueMismatch {
            symbol: "ut_send",
            index: 0,
            expected: "(8, 0x0, 0, 0)".into(),
            actual: "(9, 0x0, 0, 0)".into(),
        }
    );
}

#[test]
fn socket_and_close_can_be_mocked_together() -> Result<(), VerifyError> {
    let sockets = mock!(mock_socket);
    let closes = mock!(mock_close);
    sockets.return_value(11);
    assert_eq!(prod_open_and_close(), 0);
    sockets
        .expect_called_once()?
        .with_values((libc::AF_INET, libc::SOCK_STREAM, 0))?;
    closes.expect_called_once()?.with_values((11,))?;
    Ok(())
}

#[test]
fn failing_socket_skips_close() -> Result<(), VerifyError> {
    let sockets = mock!(mock_socket);
    let closes = mock!(mock_close);
    sockets.return_value(-1);
    assert_eq!(prod_open_and_close(), -1);
    closes.expect_not_called()?;
    Ok(())
}

#[test]
fn connect_receives_the_address_pointer() -> Result<(), VerifyError> {
    // SAFETY: all-zero bytes are a valid `sockaddr`.
    let addr: libc::sockaddr = unsafe { std::mem::zeroed() };
    let m = mock!(mock_connect);
    let len = std::mem::size_of::<libc::sockaddr>() as libc::socklen_t;
    // SAFETY: the mock never dereferences the address.
    let rc = unsafe { ut_connect(4, &addr, len) };
    assert_eq!(rc, 0);
    let checker = m.expect_called_once()?;
    let (fd, ptr_seen, len_seen) = checker.calls()[0];
    assert_eq!(fd, 4);
    assert!(ptr::eq(ptr_seen, &addr));
    assert_eq!(len_seen, len);
    Ok(())
}

#[test]
fn untouched_entries_reach_the_real_pipe() {
    let mut fds = [0 as c_int; 2];
    // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

    let payload = b"premock";
    // SAFETY: `payload` is valid for reads of its length.
    let written = unsafe { ut_write(fds[1], payload.as_ptr().cast(), payload.len()) };
    assert_eq!(written, payload.len() as isize);

    let mut buf = [0_u8; 16];
    // SAFETY: `buf` is valid for writes of its length.
    let read = unsafe { ut_read(fds[0], buf.as_mut_ptr().cast(), buf.len()) };
    assert_eq!(read, payload.len() as isize);
    assert_eq!(&buf[..payload.len()], payload);

    // SAFETY: both descriptors came from pipe(2) above.
    unsafe {
        assert_eq!(ut_close(fds[0]), 0);
        assert_eq!(ut_close(fds[1]), 0);
    }
    assert!(mock_close().is_real());
}
