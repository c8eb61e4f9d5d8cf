pub mod console;
pub mod terminal_surface;

use ::crossterm::event::Event;
use std::io;
use std::time::Duration;

pub use terminal_surface::{HostedSurface, TerminalSurfaceHost};

pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }
}
