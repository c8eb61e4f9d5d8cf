//! Per-tab content contract and tab registration.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("{0}")]
    Message(String),
}

impl PageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Produces a tab's content when the tab becomes active and releases it when
/// the tab is deactivated.
///
/// Content is moved into [`PageFactory::dispose_content`], so a mounted value
/// can be disposed at most once and is never shared between tabs.
pub trait PageFactory {
    type Content;

    fn create_content(&mut self) -> Result<Self::Content, PageError>;

    /// Must release everything the content holds, such as store subscriptions.
    fn dispose_content(&mut self, content: Self::Content) -> Result<(), PageError>;
}

impl<T: PageFactory + ?Sized> PageFactory for Box<T> {
    type Content = T::Content;

    fn create_content(&mut self) -> Result<Self::Content, PageError> {
        (**self).create_content()
    }

    fn dispose_content(&mut self, content: Self::Content) -> Result<(), PageError> {
        (**self).dispose_content(content)
    }
}

/// A registered debug page: the icon shown on the handle plus its factory.
#[derive(Debug)]
pub struct Tab<F> {
    icon: String,
    factory: F,
}

impl<F: PageFactory> Tab<F> {
    pub fn new(icon: impl Into<String>, factory: F) -> Self {
        Self {
            icon: icon.into(),
            factory,
        }
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub(crate) fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }
}
