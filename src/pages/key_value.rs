//! Key/value inspector: named categories of string pairs that the host
//! application updates while the overlay shows them.

use std::sync::{Arc, Mutex};

use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

use super::{BoxedPage, PageView, ScrollOffset};
use crate::page::{PageError, PageFactory};
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvCategory {
    name: String,
    entries: Vec<KvEntry>,
}

impl KvCategory {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[KvEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    categories: Vec<KvCategory>,
    revision: u64,
    subscribers: usize,
}

impl StoreInner {
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Shared store; clones see the same categories. Categories and keys keep
/// their insertion order.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, category: &str, key: &str, value: impl Into<String>) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let value = value.into();
        let index = match inner.categories.iter().position(|c| c.name == category) {
            Some(index) => index,
            None => {
                inner.categories.push(KvCategory {
                    name: category.to_string(),
                    entries: Vec::new(),
                });
                inner.categories.len() - 1
            }
        };
        let entries = &mut inner.categories[index].entries;
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) if entry.value == value => return,
            Some(entry) => entry.value = value,
            None => entries.push(KvEntry {
                key: key.to_string(),
                value,
            }),
        }
        inner.touch();
    }

    /// Remove one key. The category stays, possibly empty.
    pub fn remove(&self, category: &str, key: &str) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        let Some(found) = inner.categories.iter_mut().find(|c| c.name == category) else {
            return false;
        };
        let before = found.entries.len();
        found.entries.retain(|entry| entry.key != key);
        let removed = found.entries.len() != before;
        if removed {
            inner.touch();
        }
        removed
    }

    pub fn remove_category(&self, category: &str) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        let before = inner.categories.len();
        inner.categories.retain(|c| c.name != category);
        let removed = inner.categories.len() != before;
        if removed {
            inner.touch();
        }
        removed
    }

    pub fn categories(&self) -> Vec<KvCategory> {
        self.inner
            .lock()
            .map(|inner| inner.categories.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, category: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().ok()?;
        inner
            .categories
            .iter()
            .find(|c| c.name == category)?
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.clone())
    }

    /// Bumped by every change.
    pub fn revision(&self) -> u64 {
        self.inner.lock().map(|inner| inner.revision).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.subscribers).unwrap_or(0)
    }

    pub fn subscribe(&self) -> KvSubscription {
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers += 1;
        }
        KvSubscription {
            store: Some(self.clone()),
            seen: None,
        }
    }
}

/// A live view on the store. Released explicitly or on drop, never twice.
#[derive(Debug)]
pub struct KvSubscription {
    store: Option<KeyValueStore>,
    seen: Option<u64>,
}

impl KvSubscription {
    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// True once per store change, and on the first call.
    pub fn poll_changed(&mut self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        let revision = store.revision();
        if self.seen == Some(revision) {
            return false;
        }
        self.seen = Some(revision);
        true
    }

    pub fn categories(&self) -> Vec<KvCategory> {
        self.store
            .as_ref()
            .map(KeyValueStore::categories)
            .unwrap_or_default()
    }

    pub fn release(&mut self) {
        if let Some(store) = self.store.take()
            && let Ok(mut inner) = store.inner.lock()
        {
            inner.subscribers = inner.subscribers.saturating_sub(1);
        }
    }
}

impl Drop for KvSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

enum Row {
    Header(String),
    Entry(String),
}

pub struct KeyValuePage {
    subscription: KvSubscription,
    rows: Vec<Row>,
    scroll: ScrollOffset,
}

impl KeyValuePage {
    pub fn new(subscription: KvSubscription) -> Self {
        Self {
            subscription,
            rows: Vec::new(),
            scroll: ScrollOffset::default(),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    fn refresh(&mut self) {
        if !self.subscription.poll_changed() {
            return;
        }
        self.rows = self
            .subscription
            .categories()
            .into_iter()
            .filter(|category| !category.is_empty())
            .flat_map(|category| {
                let header = Row::Header(category.name.clone());
                let entries = category
                    .entries
                    .into_iter()
                    .map(|entry| Row::Entry(format!("  {} = {}", entry.key, entry.value)));
                std::iter::once(header).chain(entries)
            })
            .collect();
    }
}

impl PageView for KeyValuePage {
    fn title(&self) -> &str {
        "Key/Value"
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.refresh();
        if self.rows.is_empty() {
            let style = Style::default().fg(Color::DarkGray);
            frame.set_string(area.x, area.y, "No values recorded", style, area);
            return;
        }
        let view = usize::from(area.height);
        self.scroll.update(self.rows.len(), view);
        let header_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let rows = self.rows.iter().skip(self.scroll.offset()).take(view);
        for (y, row) in (area.y..).zip(rows) {
            match row {
                Row::Header(name) => frame.set_string(area.x, y, name, header_style, area),
                Row::Entry(text) => frame.set_string(area.x, y, text, Style::default(), area),
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        self.scroll.handle_event(event)
    }

    fn dispose(&mut self) -> Result<(), PageError> {
        if !self.subscription.is_active() {
            return Err(PageError::new("key/value page disposed twice"));
        }
        self.subscription.release();
        Ok(())
    }
}

/// Opens a fresh subscription for every page it creates.
#[derive(Debug, Clone)]
pub struct KeyValuePageFactory {
    store: KeyValueStore,
}

impl KeyValuePageFactory {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }
}

impl PageFactory for KeyValuePageFactory {
    type Content = BoxedPage;

    fn create_content(&mut self) -> Result<BoxedPage, PageError> {
        Ok(Box::new(KeyValuePage::new(self.store.subscribe())))
    }

    fn dispose_content(&mut self, mut content: BoxedPage) -> Result<(), PageError> {
        content.dispose()
    }
}
