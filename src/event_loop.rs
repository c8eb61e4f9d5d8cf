use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Start of an iteration: advance animations and redraw.
    Tick,
    Input(Event),
}

/// Serial dispatcher for the UI thread.
///
/// Every iteration first delivers [`LoopEvent::Tick`], then waits up to the
/// frame interval for input and delivers everything that queued up. All
/// overlay mutation happens inside the handler, so nothing else needs locks.
pub struct EventLoop<D> {
    driver: D,
    frame_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, frame_interval: Duration) -> Self {
        Self {
            driver,
            frame_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(LoopEvent) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(LoopEvent::Tick)? {
                break;
            }

            if self.driver.poll(self.frame_interval)? {
                // Drain bursts (mouse drags) in one go so ticks keep their pace.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(LoopEvent::Input(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
