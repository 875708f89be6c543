// ── Active locale ──
//
// The notification layer never reads a global language setting. The
// consumer owns a `LocaleHandle` and gives the store a receiver; the store
// reads the current value at the moment a toast is built.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;

/// Interface language. Arabic is the platform's primary locale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    Ar,
    En,
}

/// Writing direction for rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Locale {
    pub fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::Rtl,
            Self::En => TextDirection::Ltr,
        }
    }

    /// The locale whose text is used when this one's field is empty.
    pub fn fallback(self) -> Self {
        match self {
            Self::Ar => Self::En,
            Self::En => Self::Ar,
        }
    }
}

/// Owner side of the active-locale subscription.
#[derive(Debug)]
pub struct LocaleHandle {
    tx: watch::Sender<Locale>,
}

impl LocaleHandle {
    pub fn new(initial: Locale) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> Locale {
        *self.tx.borrow()
    }

    /// Switch the active locale. Toasts built afterwards use the new value.
    pub fn set(&self, locale: Locale) {
        self.tx.send_replace(locale);
    }

    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.tx.subscribe()
    }
}

impl Default for LocaleHandle {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!(Locale::from_str("ar").unwrap(), Locale::Ar);
        assert_eq!(Locale::from_str("EN").unwrap(), Locale::En);
        assert!(Locale::from_str("fr").is_err());
        assert_eq!(Locale::En.to_string(), "en");
    }

    #[test]
    fn arabic_is_right_to_left() {
        assert_eq!(Locale::Ar.direction(), TextDirection::Rtl);
        assert_eq!(Locale::En.direction(), TextDirection::Ltr);
    }

    #[test]
    fn handle_updates_subscribers() {
        let handle = LocaleHandle::new(Locale::En);
        let rx = handle.subscribe();
        handle.set(Locale::Ar);
        assert_eq!(*rx.borrow(), Locale::Ar);
        assert_eq!(handle.get(), Locale::Ar);
    }
}
