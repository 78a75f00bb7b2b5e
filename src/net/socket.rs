//! Owned TCP socket descriptor
//!
//! Thin wrapper over a raw `libc` socket. The descriptor is closed exactly
//! once when the [`Socket`] is dropped; ownership moves, it is never copied.

use std::io;
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, RawFd};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::TransportError;

/// Pause between send attempts while the kernel buffer is full.
const SEND_RETRY_DELAY: Duration = Duration::from_millis(1);

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: libc::c_int = 0;

/// Readiness a caller can wait for with [`Socket::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

impl Interest {
    fn events(self) -> libc::c_short {
        match self {
            Interest::Readable => libc::POLLIN,
            Interest::Writable => libc::POLLOUT,
        }
    }
}

/// A single owned socket descriptor.
#[derive(Debug)]
pub struct Socket {
    fd: RawFd,
}

impl Socket {
    /// Allocate a new socket and enable `SO_REUSEADDR` on it.
    pub fn new(
        domain: libc::c_int,
        ty: libc::c_int,
        protocol: libc::c_int,
    ) -> Result<Self, TransportError> {
        let fd = unsafe { libc::socket(domain, ty, protocol) };
        if fd < 0 {
            return Err(TransportError::SocketCreate(io::Error::last_os_error()));
        }
        // Owned from here on: early returns close the descriptor.
        let socket = Self { fd };

        let optval: libc::c_int = 1;
        let ret = unsafe {
            libc::setsockopt(
                socket.fd,
                libc::SOL_SOCKET,
                libc::SO_REUSEADDR,
                &optval as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(TransportError::SocketCreate(io::Error::last_os_error()));
        }

        Ok(socket)
    }

    /// Allocate a stream socket matching the family of `addr`.
    pub fn stream_for(addr: &SocketAddr) -> Result<Self, TransportError> {
        let domain = if addr.is_ipv4() {
            libc::AF_INET
        } else {
            libc::AF_INET6
        };
        Self::new(domain, libc::SOCK_STREAM, 0)
    }

    /// Take ownership of an already-open descriptor (e.g. from `accept`).
    pub fn from_raw(fd: RawFd) -> Result<Self, TransportError> {
        if fd < 0 {
            return Err(TransportError::InvalidDescriptor(fd));
        }
        Ok(Self { fd })
    }

    /// Toggle `O_NONBLOCK` on the descriptor.
    pub fn set_nonblocking(&self, enable: bool) -> Result<(), TransportError> {
        let flags = unsafe { libc::fcntl(self.fd, libc::F_GETFL, 0) };
        if flags < 0 {
            return Err(TransportError::SocketControl(io::Error::last_os_error()));
        }

        let flags = if enable {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };

        if unsafe { libc::fcntl(self.fd, libc::F_SETFL, flags) } < 0 {
            return Err(TransportError::SocketControl(io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Connect to `addr`, waiting at most `timeout` for the handshake.
    ///
    /// The socket is switched to non-blocking mode first and stays that way
    /// afterwards, even when the connect completes immediately.
    pub fn connect(&self, addr: SocketAddr, timeout: Duration) -> Result<(), TransportError> {
        self.set_nonblocking(true)?;

        let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
        let addr_len = socket_addr_to_sockaddr(addr, &mut storage);

        let ret = unsafe {
            libc::connect(
                self.fd,
                &storage as *const _ as *const libc::sockaddr,
                addr_len,
            )
        };
        if ret == 0 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINPROGRESS) {
            return Err(TransportError::ConnectFailed(err));
        }

        let ready = self
            .poll(Interest::Writable, timeout)
            .map_err(TransportError::Poll)?;
        if !ready {
            return Err(TransportError::ConnectTimeout(timeout.as_millis() as u64));
        }

        let mut so_error: libc::c_int = 0;
        let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
        let ret = unsafe {
            libc::getsockopt(
                self.fd,
                libc::SOL_SOCKET,
                libc::SO_ERROR,
                &mut so_error as *mut _ as *mut libc::c_void,
                &mut len,
            )
        };
        if ret < 0 {
            return Err(TransportError::ConnectFailed(io::Error::last_os_error()));
        }
        if so_error != 0 {
            return Err(TransportError::ConnectFailed(io::Error::from_raw_os_error(
                so_error,
            )));
        }

        Ok(())
    }

    /// Wait until the socket is ready for `interest` or `timeout` elapses.
    ///
    /// Interrupted polls are retried with the remaining time.
    pub fn poll(&self, interest: Interest, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: interest.events(),
            revents: 0,
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let timeout_ms = remaining.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
            let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if ret < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            return Ok(ret > 0);
        }
    }

    /// Send the whole buffer, retrying while the socket would block.
    pub fn send(&self, buf: &[u8]) -> Result<usize, TransportError> {
        write_fully(buf, |chunk| {
            let ret = unsafe {
                libc::send(
                    self.fd,
                    chunk.as_ptr() as *const libc::c_void,
                    chunk.len(),
                    SEND_FLAGS,
                )
            };
            if ret < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(ret as usize)
            }
        })
    }

    /// Issue one read.
    ///
    /// Returns `Ok(None)` when the read would block, `Ok(Some(0))` when the
    /// peer closed the connection, otherwise the number of bytes read.
    pub fn recv(&self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        self.recv_with_flags(buf, 0)
    }

    /// Non-destructive, non-blocking read of a single byte.
    pub fn peek(&self) -> Result<Option<usize>, TransportError> {
        let mut byte = [0u8; 1];
        self.recv_with_flags(&mut byte, libc::MSG_PEEK | libc::MSG_DONTWAIT)
    }

    fn recv_with_flags(
        &self,
        buf: &mut [u8],
        flags: libc::c_int,
    ) -> Result<Option<usize>, TransportError> {
        let ret = unsafe {
            libc::recv(
                self.fd,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                flags,
            )
        };
        if ret < 0 {
            let err = io::Error::last_os_error();
            debug!(error = %err, "recv() returned -1");
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(None);
            }
            return Err(TransportError::Recv(err));
        }
        debug!(bytes = ret, "recv() returned");
        Ok(Some(ret as usize))
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if self.fd >= 0 {
            debug!(fd = self.fd, "Closing socket");
            unsafe {
                libc::close(self.fd);
            }
            self.fd = -1;
        }
    }
}

/// Drive `write` until all of `buf` has been accepted.
///
/// `WouldBlock` pauses briefly and retries; any other error is fatal.
pub(crate) fn write_fully<F>(buf: &[u8], mut write: F) -> Result<usize, TransportError>
where
    F: FnMut(&[u8]) -> io::Result<usize>,
{
    let mut total = 0;
    while total < buf.len() {
        match write(&buf[total..]) {
            Ok(0) => {
                return Err(TransportError::Send(io::Error::from(io::ErrorKind::WriteZero)));
            }
            Ok(n) => {
                debug!(bytes = n, "send() returned");
                total += n;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(SEND_RETRY_DELAY);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(TransportError::Send(e)),
        }
    }
    Ok(total)
}

/// Fill `storage` with the C representation of `addr`; returns its length.
fn socket_addr_to_sockaddr(
    addr: SocketAddr,
    storage: &mut libc::sockaddr_storage,
) -> libc::socklen_t {
    match addr {
        SocketAddr::V4(v4) => {
            let sa = storage as *mut _ as *mut libc::sockaddr_in;
            unsafe {
                (*sa).sin_family = libc::AF_INET as libc::sa_family_t;
                (*sa).sin_port = v4.port().to_be();
                (*sa).sin_addr.s_addr = u32::from_ne_bytes(v4.ip().octets());
            }
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t
        }
        SocketAddr::V6(v6) => {
            let sa = storage as *mut _ as *mut libc::sockaddr_in6;
            unsafe {
                (*sa).sin6_family = libc::AF_INET6 as libc::sa_family_t;
                (*sa).sin6_port = v6.port().to_be();
                (*sa).sin6_flowinfo = v6.flowinfo();
                (*sa).sin6_addr.s6_addr = v6.ip().octets();
                (*sa).sin6_scope_id = v6.scope_id();
            }
            std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t
        }
    }
}
