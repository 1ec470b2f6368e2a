use std::io::Write;
use std::os::fd::AsRawFd;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ChannelError, Result};
use crate::traits::Channel;

/// A [`Channel`] over a connected Unix domain socket.
///
/// Reads never block: `available` asks the kernel how many bytes are queued
/// (`FIONREAD`) and `read_byte` performs a non-blocking one-byte `recv`.
/// Writes are staged locally and pushed to the socket on [`Channel::flush`].
pub struct SocketChannel {
    stream: UnixStream,
    pending: Vec<u8>,
}

impl SocketChannel {
    /// Wrap an already connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    /// Create a connected pair of socket channels.
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = UnixStream::pair()?;
        Ok((Self::from_stream(left), Self::from_stream(right)))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &UnixStream {
        &self.stream
    }

    /// Consume the channel and return the stream. Unflushed bytes are dropped.
    pub fn into_inner(self) -> UnixStream {
        self.stream
    }

    fn queued_bytes(&self) -> Result<usize> {
        let mut queued: libc::c_int = 0;
        // SAFETY: the descriptor is owned by `self.stream` and stays open for the
        // duration of the call; `queued` is a valid writable c_int.
        let rc = unsafe {
            libc::ioctl(
                self.stream.as_raw_fd(),
                libc::FIONREAD,
                &mut queued as *mut libc::c_int,
            )
        };
        if rc < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(usize::try_from(queued).unwrap_or(0))
    }

    /// Non-blocking `recv`, optionally peeking. `Ok(None)` means nothing queued.
    fn recv_now(&self, buf: &mut [u8], peek: bool) -> Result<Option<usize>> {
        let mut flags = libc::MSG_DONTWAIT;
        if peek {
            flags |= libc::MSG_PEEK;
        }
        // SAFETY: `buf` is a valid writable region of `buf.len()` bytes and the
        // descriptor is owned by `self.stream`.
        let rc = unsafe {
            libc::recv(
                self.stream.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                flags,
            )
        };
        if rc >= 0 {
            return Ok(Some(rc as usize));
        }
        let err = std::io::Error::last_os_error();
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => Ok(None),
            _ => Err(err.into()),
        }
    }
}

impl Channel for SocketChannel {
    fn available(&mut self) -> Result<usize> {
        let queued = self.queued_bytes()?;
        if queued > 0 {
            return Ok(queued);
        }
        // Nothing queued: distinguish "quiet" from "peer hung up".
        let mut probe = [0u8; 1];
        match self.recv_now(&mut probe, true)? {
            Some(0) => Err(ChannelError::Closed),
            Some(n) => Ok(n),
            None => Ok(0),
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.recv_now(&mut byte, false)? {
            Some(1) => Ok(Some(byte[0])),
            _ => Ok(None),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.pending.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.stream.write_all(&self.pending)?;
            self.pending.clear();
        }
        self.stream.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SocketChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketChannel")
            .field("fd", &self.stream.as_raw_fd())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Filesystem-path Unix domain socket listener producing [`SocketChannel`]s.
///
/// The socket file is removed on drop, unless something else has replaced it
/// at the same path in the meantime.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    created_inode: (u64, u64),
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// `sockaddr_un.sun_path` capacity.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen at `path`, replacing a stale socket file if present.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind and listen at `path` with an explicit permission mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bind_err = |source: std::io::Error| ChannelError::Bind {
            path: path.clone(),
            source,
        };

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(ChannelError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        remove_stale_socket(&path).map_err(bind_err)?;

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(bind_err)?;
        let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(?path, "listening on unix domain socket");

        Ok(Self {
            listener,
            created_inode: (metadata.dev(), metadata.ino()),
            path,
        })
    }

    /// Accept one incoming connection (blocking).
    pub fn accept(&self) -> Result<SocketChannel> {
        let (stream, _addr) = self.listener.accept().map_err(ChannelError::Accept)?;
        debug!(path = ?self.path, "accepted connection");
        Ok(SocketChannel::from_stream(stream))
    }

    /// Connect to a listening socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<SocketChannel> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| ChannelError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(SocketChannel::from_stream(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn remove_stale_socket(path: &Path) -> std::io::Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if !metadata.file_type().is_socket() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "existing path is not a unix socket",
        ));
    }
    debug!(?path, "removing stale socket");
    std::fs::remove_file(path)
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        let same_file = metadata.file_type().is_socket()
            && (metadata.dev(), metadata.ino()) == self.created_inode;
        if same_file {
            debug!(path = ?self.path, "cleaning up socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path identity changed; skipping cleanup");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("serialink-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn wait_for(channel: &mut SocketChannel, count: usize) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while channel.available().unwrap() < count {
            assert!(std::time::Instant::now() < deadline, "bytes never arrived");
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    #[test]
    fn pair_round_trip() {
        let (mut left, mut right) = SocketChannel::pair().unwrap();

        assert_eq!(right.available().unwrap(), 0);
        assert_eq!(right.read_byte().unwrap(), None);

        left.write_all(&[0xC1, 0x02, 0xAA]).unwrap();
        // Nothing leaves before flush.
        assert_eq!(right.available().unwrap(), 0);
        left.flush().unwrap();

        wait_for(&mut right, 3);
        assert_eq!(right.read_byte().unwrap(), Some(0xC1));
        assert_eq!(right.read_byte().unwrap(), Some(0x02));
        assert_eq!(right.read_byte().unwrap(), Some(0xAA));
        assert_eq!(right.read_byte().unwrap(), None);
    }

    #[test]
    fn available_reports_peer_shutdown() {
        let (left, mut right) = SocketChannel::pair().unwrap();
        drop(left);

        assert!(matches!(right.available(), Err(ChannelError::Closed)));
        assert_eq!(right.read_byte().unwrap(), None);
    }

    #[test]
    fn queued_bytes_survive_peer_shutdown() {
        let (mut left, mut right) = SocketChannel::pair().unwrap();
        left.write_all(&[1, 2]).unwrap();
        left.flush().unwrap();
        drop(left);

        assert_eq!(right.available().unwrap(), 2);
        assert_eq!(right.drain().unwrap(), 2);
        assert!(matches!(right.available(), Err(ChannelError::Closed)));
    }

    #[test]
    fn bind_accept_connect() {
        let dir = temp_dir("uds-accept");
        let sock_path = dir.join("link.sock");

        let listener = UnixDomainSocket::bind(&sock_path).unwrap();
        assert!(sock_path.exists());
        assert_eq!(listener.path(), sock_path.as_path());

        let path_clone = sock_path.clone();
        let client = std::thread::spawn(move || {
            let mut channel = UnixDomainSocket::connect(&path_clone).unwrap();
            channel.write_all(b"ping").unwrap();
            channel.flush().unwrap();
        });

        let mut server = listener.accept().unwrap();
        client.join().unwrap();
        wait_for(&mut server, 4);
        let mut received = Vec::new();
        while let Some(byte) = server.read_byte().unwrap() {
            received.push(byte);
        }
        assert_eq!(received, b"ping");

        drop(listener);
        assert!(!sock_path.exists(), "socket file should be removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_applies_default_mode() {
        let dir = temp_dir("uds-mode");
        let sock_path = dir.join("mode.sock");

        let listener = UnixDomainSocket::bind(&sock_path).unwrap();
        let mode = std::fs::metadata(&sock_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_rejects_long_path() {
        let long_path = "/tmp/".to_string() + &"s".repeat(200) + ".sock";
        let result = UnixDomainSocket::bind(&long_path);
        assert!(matches!(result, Err(ChannelError::PathTooLong { .. })));
    }

    #[test]
    fn bind_refuses_to_replace_regular_file() {
        let dir = temp_dir("uds-regular");
        let sock_path = dir.join("plain.sock");
        std::fs::write(&sock_path, b"not a socket").unwrap();

        let result = UnixDomainSocket::bind(&sock_path);
        assert!(matches!(result, Err(ChannelError::Bind { .. })));
        assert!(sock_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn connect_to_missing_path_fails() {
        let dir = temp_dir("uds-missing");
        let result = UnixDomainSocket::connect(dir.join("absent.sock"));
        assert!(matches!(result, Err(ChannelError::Connect { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
