//! Privileged access to device nodes.
//!
//! The engine never opens files itself. Embedders supply a
//! [`ResourceAccess`] implementation at context creation; transports reach
//! it through a [`DeviceOpener`] bound to the context's user data.

/// Raw file descriptor returned by an open callback.
pub type Fd = i32;

/// Positive errno value reported by a failed open.
pub type Errno = i32;

pub const O_RDONLY: i32 = 0;
pub const O_RDWR: i32 = 0o2;
pub const O_NONBLOCK: i32 = 0o4000;
pub const O_CLOEXEC: i32 = 0o2_000_000;

/// Flags transports pass when opening an input node.
pub const DEFAULT_OPEN_FLAGS: i32 = O_RDWR | O_NONBLOCK | O_CLOEXEC;

const EACCES: Errno = 13;

/// Open/close callback pair supplied by the embedder.
///
/// Callbacks run synchronously inside the engine and must not call back
/// into the context that invoked them.
pub trait ResourceAccess<U> {
    fn open_restricted(&mut self, path: &str, flags: i32, user_data: &mut U) -> Result<Fd, Errno>;

    fn close_restricted(&mut self, fd: Fd, user_data: &mut U);
}

/// [`ResourceAccess`] built from two closures.
pub struct FnAccess<O, C> {
    open: O,
    close: C,
}

/// Wrap an open and a close closure into a [`ResourceAccess`].
pub fn access_fn<U, O, C>(open: O, close: C) -> FnAccess<O, C>
where
    O: FnMut(&str, i32, &mut U) -> Result<Fd, Errno>,
    C: FnMut(Fd, &mut U),
{
    FnAccess { open, close }
}

impl<U, O, C> ResourceAccess<U> for FnAccess<O, C>
where
    O: FnMut(&str, i32, &mut U) -> Result<Fd, Errno>,
    C: FnMut(Fd, &mut U),
{
    fn open_restricted(&mut self, path: &str, flags: i32, user_data: &mut U) -> Result<Fd, Errno> {
        (self.open)(path, flags, user_data)
    }

    fn close_restricted(&mut self, fd: Fd, user_data: &mut U) {
        (self.close)(fd, user_data);
    }
}

/// Refuses every open with `EACCES`. For transports that need no device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAccess;

impl<U> ResourceAccess<U> for DenyAccess {
    fn open_restricted(
        &mut self,
        _path: &str,
        _flags: i32,
        _user_data: &mut U,
    ) -> Result<Fd, Errno> {
        Err(EACCES)
    }

    fn close_restricted(&mut self, _fd: Fd, _user_data: &mut U) {}
}

/// Device-node access as seen by a transport.
pub trait DeviceOpener {
    fn open(&mut self, path: &str, flags: i32) -> Result<Fd, Errno>;

    fn close(&mut self, fd: Fd);
}

/// A [`ResourceAccess`] bound to the user data it receives.
pub(crate) struct BoundAccess<'a, U> {
    pub(crate) access: &'a mut dyn ResourceAccess<U>,
    pub(crate) user_data: &'a mut U,
}

impl<U> DeviceOpener for BoundAccess<'_, U> {
    fn open(&mut self, path: &str, flags: i32) -> Result<Fd, Errno> {
        let fd = self.access.open_restricted(path, flags, self.user_data);
        match &fd {
            Ok(fd) => print_debug!("opened {path} as fd {fd}"),
            Err(errno) => print_debug!("open {path} failed: errno {errno}"),
        }
        fd
    }

    fn close(&mut self, fd: Fd) {
        print_debug!("closing fd {fd}");
        self.access.close_restricted(fd, self.user_data);
    }
}
