use std::{
    io::{self, Write},
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
};

use crate::cutils::cerr;

pub mod signal;

pub mod stderr;

/// Create a unidirectional pipe whose ends are closed on exec.
///
/// Returns the read end first.
pub(crate) fn pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut pipes = [-1, -1];
    // SAFETY: A valid pointer to a mutable array of 2 fds is passed in.
    unsafe {
        cerr(libc::pipe2(pipes.as_mut_ptr(), libc::O_CLOEXEC))?;
    }
    // SAFETY: pipe2 created two owned pipe fds
    Ok(unsafe {
        (
            OwnedFd::from_raw_fd(pipes[0]),
            OwnedFd::from_raw_fd(pipes[1]),
        )
    })
}

/// Duplicate `fd` onto the lowest free descriptor, with close-on-exec set.
pub(crate) fn dup(fd: RawFd) -> io::Result<OwnedFd> {
    // SAFETY: F_DUPFD_CLOEXEC does not touch any memory.
    let new_fd = cerr(unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) })?;
    // SAFETY: fcntl returned a fresh descriptor that nobody else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(new_fd) })
}

/// Make `target` refer to the same open file as `source`.
pub(crate) fn dup2<F: AsRawFd>(source: &F, target: RawFd) -> io::Result<()> {
    loop {
        // SAFETY: dup2 only affects the descriptor table.
        match cerr(unsafe { libc::dup2(source.as_raw_fd(), target) }) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            result => return result.map(drop),
        }
    }
}

/// Check that `fd` refers to an open file description.
pub(crate) fn is_open(fd: RawFd) -> io::Result<()> {
    // SAFETY: F_GETFD does not touch any memory.
    cerr(unsafe { libc::fcntl(fd, libc::F_GETFD) }).map(drop)
}

/// Push any buffered standard error output to its descriptor.
///
/// This covers both Rust's handle and every C stdio output stream, since the
/// native formatter writes through the latter.
pub(crate) fn flush_stderr() {
    let _ = io::stderr().flush();
    // SAFETY: a null stream asks libc to flush all open output streams.
    unsafe {
        libc::fflush(std::ptr::null_mut());
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::{Read, Write},
        os::fd::AsRawFd,
    };

    use super::stderr::tests::stderr_test_lock;
    use super::{dup, dup2, is_open, pipe};

    #[test]
    fn pipe_delivers_eof_once_writer_is_gone() {
        let _lock = stderr_test_lock();
        let (read_end, write_end) = pipe().unwrap();
        File::from(write_end).write_all(b"hello").unwrap();

        let mut text = String::new();
        File::from(read_end).read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn dup_shares_the_open_file() {
        let _lock = stderr_test_lock();
        let (read_end, write_end) = pipe().unwrap();
        let copy = dup(write_end.as_raw_fd()).unwrap();
        assert_ne!(copy.as_raw_fd(), write_end.as_raw_fd());

        File::from(copy).write_all(b"via copy").unwrap();
        drop(write_end);

        let mut text = String::new();
        File::from(read_end).read_to_string(&mut text).unwrap();
        assert_eq!(text, "via copy");
    }

    #[test]
    fn dup2_onto_existing_descriptor() {
        let _lock = stderr_test_lock();
        let (read_a, write_a) = pipe().unwrap();
        let (read_b, write_b) = pipe().unwrap();

        dup2(&write_b, write_a.as_raw_fd()).unwrap();
        let mut write_a = File::from(write_a);
        write_a.write_all(b"rerouted").unwrap();
        drop(write_a);
        drop(write_b);

        let mut text = String::new();
        File::from(read_b).read_to_string(&mut text).unwrap();
        assert_eq!(text, "rerouted");

        let mut text = String::new();
        File::from(read_a).read_to_string(&mut text).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn closed_descriptors_are_reported() {
        // nothing else may reuse the descriptor number meanwhile
        let _lock = stderr_test_lock();
        let (read_end, _write_end) = pipe().unwrap();
        let fd = read_end.as_raw_fd();
        assert!(is_open(fd).is_ok());
        drop(read_end);

        let err = is_open(fd).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
        assert!(is_open(-1).is_err());
    }
}
