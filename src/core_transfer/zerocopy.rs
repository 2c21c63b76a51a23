//! Zero-copy file-to-socket transfer.
//!
//! On Linux the bytes go straight from the page cache to the socket with
//! `sendfile(2)`; elsewhere a small staging buffer is used. Either way the
//! file cursor advances by exactly the returned byte count, so callers can
//! loop on the same handle.

use std::fs::File;
use std::io;

use tokio::net::TcpStream;

/// Moves up to `max` bytes from `file` to `stream`.
///
/// Returns the number of bytes actually moved; `Ok(0)` means the file had no
/// more bytes to give. `WouldBlock` and `Interrupted` surface unchanged for
/// the caller's readiness loop to handle. The stream must be polled for
/// writability first; this call itself never waits.
#[cfg(target_os = "linux")]
pub fn file_to_socket(stream: &TcpStream, file: &File, max: usize) -> io::Result<usize> {
    use std::os::unix::io::AsRawFd;
    use tokio::io::Interest;

    let sock_fd = stream.as_raw_fd();
    let file_fd = file.as_raw_fd();
    stream.try_io(Interest::WRITABLE, || {
        let sent = unsafe { libc::sendfile(sock_fd, file_fd, std::ptr::null_mut(), max) };
        if sent < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(sent as usize)
        }
    })
}

#[cfg(not(target_os = "linux"))]
pub fn file_to_socket(stream: &TcpStream, file: &File, max: usize) -> io::Result<usize> {
    use std::io::{Read, Seek, SeekFrom};

    let mut buf = vec![0u8; max];
    let read = (&*file).read(&mut buf)?;
    if read == 0 {
        return Ok(0);
    }
    match stream.try_write(&buf[..read]) {
        Ok(written) => {
            if written < read {
                // rewind what the socket did not take so the next call
                // re-reads it
                (&*file).seek(SeekFrom::Current(written as i64 - read as i64))?;
            }
            Ok(written)
        }
        Err(e) => {
            (&*file).seek(SeekFrom::Current(-(read as i64)))?;
            Err(e)
        }
    }
}
