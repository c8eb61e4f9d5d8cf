#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use debug_overlay::{
    PageError, PageFactory, ScreenPosition, SurfaceError, SurfaceHost, SurfaceId, SurfaceSpec,
    Tab,
};

/// Everything the session asked of the host and the factories, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add(SurfaceId, SurfaceSpec),
    Move(SurfaceId, ScreenPosition),
    Visible(SurfaceId, bool),
    Remove(SurfaceId),
    Create { tab: usize, serial: u32 },
    Dispose { tab: usize, serial: u32 },
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct RecordingHost {
    journal: Journal,
    next_id: u64,
    live: BTreeSet<SurfaceId>,
    /// Number of further `add_surface` calls to grant; `None` grants all.
    grants: Option<usize>,
}

impl RecordingHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Rc::clone(journal),
            next_id: 1,
            live: BTreeSet::new(),
            grants: None,
        }
    }

    /// Refuse every surface after the first `count`.
    pub fn granting(journal: &Journal, count: usize) -> Self {
        Self {
            grants: Some(count),
            ..Self::new(journal)
        }
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn grant(&mut self, count: usize) {
        self.grants = Some(count);
    }

    fn check(&self, id: SurfaceId) -> Result<(), SurfaceError> {
        if self.live.contains(&id) {
            Ok(())
        } else {
            Err(SurfaceError::UnknownSurface(id))
        }
    }
}

impl SurfaceHost for RecordingHost {
    fn add_surface(&mut self, spec: SurfaceSpec) -> Result<SurfaceId, SurfaceError> {
        if let Some(grants) = self.grants.as_mut() {
            if *grants == 0 {
                return Err(SurfaceError::PermissionDenied);
            }
            *grants -= 1;
        }
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.journal.borrow_mut().push(Call::Add(id, spec));
        Ok(id)
    }

    fn update_position(
        &mut self,
        id: SurfaceId,
        position: ScreenPosition,
    ) -> Result<(), SurfaceError> {
        self.check(id)?;
        self.journal.borrow_mut().push(Call::Move(id, position));
        Ok(())
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) -> Result<(), SurfaceError> {
        self.check(id)?;
        self.journal.borrow_mut().push(Call::Visible(id, visible));
        Ok(())
    }

    fn remove_surface(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        self.check(id)?;
        self.live.remove(&id);
        self.journal.borrow_mut().push(Call::Remove(id));
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Content {
    pub tab: usize,
    pub serial: u32,
}

pub struct CountingFactory {
    tab: usize,
    journal: Journal,
    serial: u32,
    pub fail_create: bool,
    pub fail_dispose: bool,
}

impl CountingFactory {
    pub fn new(tab: usize, journal: &Journal) -> Self {
        Self {
            tab,
            journal: Rc::clone(journal),
            serial: 0,
            fail_create: false,
            fail_dispose: false,
        }
    }
}

impl PageFactory for CountingFactory {
    type Content = Content;

    fn create_content(&mut self) -> Result<Content, PageError> {
        if self.fail_create {
            return Err(PageError::new("content unavailable"));
        }
        self.serial += 1;
        self.journal.borrow_mut().push(Call::Create {
            tab: self.tab,
            serial: self.serial,
        });
        Ok(Content {
            tab: self.tab,
            serial: self.serial,
        })
    }

    fn dispose_content(&mut self, content: Content) -> Result<(), PageError> {
        self.journal.borrow_mut().push(Call::Dispose {
            tab: content.tab,
            serial: content.serial,
        });
        if self.fail_dispose {
            return Err(PageError::new("listener already gone"));
        }
        Ok(())
    }
}

/// Tabs "A" and "B".
pub fn two_tabs(journal: &Journal) -> Vec<Tab<CountingFactory>> {
    vec![
        Tab::new("A", CountingFactory::new(0, journal)),
        Tab::new("B", CountingFactory::new(1, journal)),
    ]
}

pub fn take(journal: &Journal) -> Vec<Call> {
    std::mem::take(&mut *journal.borrow_mut())
}

pub fn creates(calls: &[Call]) -> Vec<(usize, u32)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Create { tab, serial } => Some((*tab, *serial)),
            _ => None,
        })
        .collect()
}

pub fn disposes(calls: &[Call]) -> Vec<(usize, u32)> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Dispose { tab, serial } => Some((*tab, *serial)),
            _ => None,
        })
        .collect()
}
