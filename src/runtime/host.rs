//! Host side of the bridge: where primitive output actually goes.
//!
//! The C-ABI shims in [`super::abi`] cannot carry a receiver, so they write
//! through whichever [`HostIo`] is installed on the calling thread. Without an
//! explicit install that is [`StdoutHost`].

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

/// The single capability the primitives need.
pub trait HostIo {
    fn emit(&mut self, text: &str);
}

/// Writes straight to the process stdout, flushing after every write so that
/// output order matches call order.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutHost;

impl HostIo for StdoutHost {
    fn emit(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

#[derive(Debug, Default, Clone)]
pub struct CaptureHost {
    buffer: String,
}

impl CaptureHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn into_contents(self) -> String {
        self.buffer
    }
}

impl HostIo for CaptureHost {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

thread_local! {
    static ACTIVE_HOST: RefCell<Option<Box<dyn HostIo>>> = const { RefCell::new(None) };
}

struct PutBack(Option<Box<dyn HostIo>>);

impl Drop for PutBack {
    fn drop(&mut self) {
        if let Some(host) = self.0.take() {
            ACTIVE_HOST.with(|slot| {
                let mut slot = slot.borrow_mut();
                if slot.is_none() {
                    *slot = Some(host);
                }
            });
        }
    }
}

/// Runs `f` against the host installed on this thread.
///
/// The host is taken out of its slot while `f` runs, so a primitive called
/// from inside [`HostIo::emit`] writes to whatever is installed at that point
/// (stdout unless the host installs its own).
pub(crate) fn with_active_host<R>(f: impl FnOnce(&mut dyn HostIo) -> R) -> R {
    let mut active = PutBack(ACTIVE_HOST.with(|slot| slot.borrow_mut().take()));
    match active.0.as_mut() {
        Some(host) => f(host.as_mut()),
        None => f(&mut StdoutHost),
    }
}

struct RestoreHost {
    previous: Option<Box<dyn HostIo>>,
}

impl Drop for RestoreHost {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_HOST.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Installs `host` on the current thread while `f` runs.
///
/// The previous host is put back afterwards, including when `f` unwinds.
pub fn with_host<R>(host: Box<dyn HostIo>, f: impl FnOnce() -> R) -> R {
    let previous = ACTIVE_HOST.with(|slot| slot.borrow_mut().replace(host));
    let _restore = RestoreHost { previous };
    f()
}

/// Runs `f` with a [`CaptureHost`] installed and returns everything the
/// primitives emitted in the meantime.
pub fn capture_output(f: impl FnOnce()) -> String {
    struct Shared(Rc<RefCell<CaptureHost>>);

    impl HostIo for Shared {
        fn emit(&mut self, text: &str) {
            self.0.borrow_mut().emit(text);
        }
    }

    let capture = Rc::new(RefCell::new(CaptureHost::new()));
    with_host(Box::new(Shared(Rc::clone(&capture))), f);
    match Rc::try_unwrap(capture) {
        Ok(cell) => cell.into_inner().into_contents(),
        Err(shared) => shared.borrow().contents().to_string(),
    }
}
