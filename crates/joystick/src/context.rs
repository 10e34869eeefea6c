use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::access::{BoundAccess, ResourceAccess};
use crate::config::EngineConfig;
use crate::device::Device;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::transport::{Readiness, Transport};

struct ContextInner<U> {
    engine: RefCell<Engine>,
    transport: RefCell<Option<Box<dyn Transport>>>,
    access: RefCell<Box<dyn ResourceAccess<U>>>,
    user_data: RefCell<U>,
    seat: RefCell<Option<String>>,
    ready_tx: Sender<()>,
    ready_rx: Receiver<()>,
}

/// Root of the engine: owns the devices, the event queue, the
/// resource-access callbacks and the user data.
///
/// Cloning acquires a reference; the engine shuts down its transport when
/// the last handle is dropped. Devices and events handed out stay valid on
/// their own.
pub struct Context<U: 'static = ()> {
    inner: Rc<ContextInner<U>>,
}

impl<U: 'static> Clone for Context<U> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<U: 'static> Context<U> {
    pub fn new(access: impl ResourceAccess<U> + 'static, user_data: U) -> Self {
        Self::with_config(access, user_data, EngineConfig::default())
    }

    pub fn with_config(
        access: impl ResourceAccess<U> + 'static,
        user_data: U,
        config: EngineConfig,
    ) -> Self {
        let (ready_tx, ready_rx) = bounded(1);
        Self {
            inner: Rc::new(ContextInner {
                engine: RefCell::new(Engine::new(config)),
                transport: RefCell::new(None),
                access: RefCell::new(Box::new(access)),
                user_data: RefCell::new(user_data),
                seat: RefCell::new(None),
                ready_tx,
                ready_rx,
            }),
        }
    }

    /// Bind the context to a seat, starting device discovery.
    ///
    /// May succeed only once. Devices already present are dispatched
    /// immediately, so their events are queued when this returns.
    pub fn assign_seat(&self, seat: &str, transport: impl Transport + 'static) -> Result<()> {
        if let Some(current) = self.inner.seat.borrow().as_deref() {
            print_warning!("seat {current} already assigned, refusing {seat}");
            return Err(Error::SeatAlreadyAssigned(current.to_owned()));
        }

        let mut transport: Box<dyn Transport> = Box::new(transport);
        {
            let mut access = self.inner.access.borrow_mut();
            let mut user_data = self.inner.user_data.borrow_mut();
            let mut opener = BoundAccess {
                access: &mut **access,
                user_data: &mut *user_data,
            };
            let readiness = Readiness::new(self.inner.ready_tx.clone());
            if let Err(err) = transport.bind_seat(seat, &mut opener, readiness) {
                print_error!("failed to bind seat {seat}: {err}");
                return Err(err);
            }
        }

        print_info!("bound to seat {seat}");
        *self.inner.seat.borrow_mut() = Some(seat.to_owned());
        *self.inner.transport.borrow_mut() = Some(transport);
        self.dispatch()
    }

    pub fn seat(&self) -> Option<String> {
        self.inner.seat.borrow().clone()
    }

    /// Receiver signalled when the transport has data pending. Call
    /// [`dispatch`](Self::dispatch) promptly once it fires; the transport may
    /// drop input that waits too long.
    ///
    /// Transports without a wakeup source signal only once, at bind. The SDL
    /// transport is one of them, so pair the receiver with a timeout, e.g.
    /// `crossbeam_channel::select!` with `default(interval)`, and dispatch on
    /// both branches.
    pub fn readiness(&self) -> Receiver<()> {
        self.inner.ready_rx.clone()
    }

    /// Drain everything the transport has available into the event queue.
    /// Never blocks. A context without a seat has nothing to dispatch.
    pub fn dispatch(&self) -> Result<()> {
        while self.inner.ready_rx.try_recv().is_ok() {}

        let mut messages = Vec::new();
        {
            let mut transport = self.inner.transport.borrow_mut();
            let Some(transport) = transport.as_mut() else {
                return Ok(());
            };
            let mut access = self.inner.access.borrow_mut();
            let mut user_data = self.inner.user_data.borrow_mut();
            let mut opener = BoundAccess {
                access: &mut **access,
                user_data: &mut *user_data,
            };
            transport.poll(&mut opener, &mut messages)?;
        }

        if !messages.is_empty() {
            self.inner.engine.borrow_mut().process(messages);
        }
        Ok(())
    }

    /// Pop the oldest pending event.
    pub fn get_event(&self) -> Option<Event> {
        self.inner.engine.borrow_mut().queue.pop()
    }

    pub fn pending_events(&self) -> usize {
        self.inner.engine.borrow().queue.len()
    }

    /// Live devices ordered by user index.
    pub fn devices(&self) -> Vec<Device> {
        self.inner.engine.borrow().registry.devices()
    }

    pub fn config(&self) -> EngineConfig {
        self.inner.engine.borrow().config.clone()
    }

    pub fn user_data(&self) -> Ref<'_, U> {
        self.inner.user_data.borrow()
    }

    pub fn user_data_mut(&self) -> RefMut<'_, U> {
        self.inner.user_data.borrow_mut()
    }

    /// Replace the user data, returning the previous value.
    pub fn set_user_data(&self, user_data: U) -> U {
        self.inner.user_data.replace(user_data)
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl<U: Default + 'static> Context<U> {
    /// Context whose transport never opens device nodes itself.
    pub fn without_access() -> Self {
        Self::new(crate::access::DenyAccess, U::default())
    }
}

impl<U> Drop for ContextInner<U> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.get_mut().take() {
            let mut opener = BoundAccess {
                access: &mut **self.access.get_mut(),
                user_data: self.user_data.get_mut(),
            };
            transport.shutdown(&mut opener);
        }
        self.engine.get_mut().shutdown();
        if let Some(seat) = self.seat.get_mut() {
            print_debug!("released seat {seat}");
        }
    }
}

impl<U: 'static> fmt::Debug for Context<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("seat", &self.seat())
            .field("devices", &self.inner.engine.borrow().registry.len())
            .field("pending", &self.pending_events())
            .finish()
    }
}
