//! Style registry
//!
//! Every distinct [`StyleConfig`] used in a workbook session is stored once, in an
//! arena slot. Cells refer to the slot through a [`StyleHandle`]. A slot is
//! registered with the engine the first time one of its cells is styled, and the
//! engine id is reused for every later cell.

use std::fmt;

use ahash::AHashMap;
use sheetcraft_core::{CellAddress, SpreadsheetEngine, StyleConfig, StyleId};

use crate::error::{Error, Result};

/// Index of a style in the [`StyleRegistry`] that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleHandle(u32);

impl StyleHandle {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StyleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "style[{}]", self.0)
    }
}

/// Lifecycle of one canonical style
#[derive(Debug, Clone, PartialEq)]
pub enum StyleEntry {
    /// Known to the registry, not yet to the engine
    Pending(StyleConfig),
    /// Registered with the engine under a fixed id
    Registered(StyleConfig, StyleId),
}

impl StyleEntry {
    pub fn config(&self) -> &StyleConfig {
        match self {
            StyleEntry::Pending(config) | StyleEntry::Registered(config, _) => config,
        }
    }

    pub fn id(&self) -> Option<StyleId> {
        match self {
            StyleEntry::Pending(_) => None,
            StyleEntry::Registered(_, id) => Some(*id),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, StyleEntry::Registered(..))
    }
}

impl Default for StyleEntry {
    fn default() -> Self {
        StyleEntry::Pending(StyleConfig::default())
    }
}

/// Read-only view of a registry entry
#[derive(Debug, Clone, Copy)]
pub struct Flyweight<'a> {
    handle: StyleHandle,
    entry: &'a StyleEntry,
}

impl<'a> Flyweight<'a> {
    pub fn handle(&self) -> StyleHandle {
        self.handle
    }

    pub fn config(&self) -> &'a StyleConfig {
        self.entry.config()
    }

    /// Engine id, `None` until the style has been applied once
    pub fn id(&self) -> Option<StyleId> {
        self.entry.id()
    }
}

impl PartialEq for Flyweight<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.config() == other.config()
    }
}

impl PartialEq<StyleConfig> for Flyweight<'_> {
    fn eq(&self, other: &StyleConfig) -> bool {
        self.config() == other
    }
}

/// Arena of canonical styles for one workbook session
#[derive(Debug, Default)]
pub struct StyleRegistry {
    entries: Vec<StyleEntry>,
    index: AHashMap<StyleConfig, StyleHandle>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `config`, adding a pending entry the first time
    /// an equal configuration is seen.
    pub fn resolve(&mut self, config: &StyleConfig) -> StyleHandle {
        if let Some(&handle) = self.index.get(config) {
            return handle;
        }
        let handle = StyleHandle(self.entries.len() as u32);
        self.entries.push(StyleEntry::Pending(config.clone()));
        self.index.insert(config.clone(), handle);
        handle
    }

    /// Record a configuration whose engine id is already known.
    ///
    /// A configuration that is already registered keeps its first id.
    pub fn seed(&mut self, config: StyleConfig, id: StyleId) -> StyleHandle {
        let handle = self.resolve(&config);
        let entry = &mut self.entries[handle.index()];
        if !entry.is_registered() {
            *entry = StyleEntry::Registered(config, id);
        }
        handle
    }

    pub fn get(&self, handle: StyleHandle) -> Option<Flyweight<'_>> {
        self.entries
            .get(handle.index())
            .map(|entry| Flyweight { handle, entry })
    }

    /// Number of distinct styles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of styles already registered with the engine
    pub fn registered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_registered()).count()
    }

    /// Styles in resolution order
    pub fn iter(&self) -> impl Iterator<Item = Flyweight<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Flyweight {
                handle: StyleHandle(i as u32),
                entry,
            })
    }

    /// Style `cell` on `sheet`, registering the style with the engine first if
    /// this is its first use.
    pub fn apply<E: SpreadsheetEngine + ?Sized>(
        &mut self,
        handle: StyleHandle,
        engine: &mut E,
        sheet: &str,
        cell: CellAddress,
    ) -> Result<StyleId> {
        let entry = self
            .entries
            .get_mut(handle.index())
            .ok_or_else(|| Error::Registration {
                style: handle.to_string(),
                source: sheetcraft_core::Error::InvalidStyle(format!(
                    "{} was not produced by this registry",
                    handle
                )),
            })?;

        let id = match entry.id() {
            Some(id) => id,
            None => {
                let id = engine
                    .register_style(entry.config())
                    .map_err(|source| Error::Registration {
                        style: entry.config().summary(),
                        source,
                    })?;
                let config = match std::mem::take(entry) {
                    StyleEntry::Pending(config) | StyleEntry::Registered(config, _) => config,
                };
                *entry = StyleEntry::Registered(config, id);
                tracing::debug!(%handle, %id, "registered style");
                id
            }
        };

        engine
            .set_cell_style(sheet, cell, id)
            .map_err(|source| Error::Apply {
                sheet: sheet.to_string(),
                cell,
                source,
            })?;
        Ok(id)
    }
}
