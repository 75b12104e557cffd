// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Process-wide leap-second table selection and lifecycle.
//!
//! A [`LeapSecondCache`] decides which [`LeapSecondTable`] is live:
//!
//! 1. On first use it reads the configured environment variable
//!    (`CDF_LEAPSECONDSTABLE` by default). A non-empty value names a table
//!    file; anything else selects the built-in table. A file that cannot be
//!    read or parsed also selects the built-in table.
//! 2. Every [`table`](LeapSecondCache::table) call compares the live
//!    variable with the value the current table was loaded under and reloads
//!    on change.
//! 3. While any [`OpenHandle`] exists the table is pinned: the variable is
//!    not consulted and reloads are deferred. Dropping the last handle clears
//!    the cache so the next query loads afresh.
//!
//! Reloads build a complete new table and swap an [`Arc`] under the lock;
//! readers keep whatever snapshot they already hold.
//!
//! Host access goes through the [`EnvSource`] and [`LineSource`] traits so
//! tests and embedders can substitute their own environment and files.

use crate::error::TableLoadError;
use crate::leap_seconds::LeapSecondTable;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info, warn};

/// Environment variable naming the leap-second table file.
pub const DEFAULT_TABLE_ENV_VAR: &str = "CDF_LEAPSECONDSTABLE";

// ═══════════════════════════════════════════════════════════════════════════
// Host capabilities
// ═══════════════════════════════════════════════════════════════════════════

/// Reads an environment variable by name.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads a text file line by line.
pub trait LineSource {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// The real process environment and filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl EnvSource for SystemHost {
    #[inline]
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl LineSource for SystemHost {
    fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        let text = std::fs::read_to_string(path)?;
        Ok(text.lines().map(str::to_owned).collect())
    }
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Name of the variable holding the table file path.
    pub env_var: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_TABLE_ENV_VAR.to_owned(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cache
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct CacheState {
    table: Option<Arc<LeapSecondTable>>,
    /// Variable value the current table was loaded under.
    configured: Option<String>,
    open_handles: usize,
}

/// Lazily loaded, reloadable, reference-counted leap-second table.
#[derive(Debug)]
pub struct LeapSecondCache<H = SystemHost> {
    host: H,
    config: TableConfig,
    state: Mutex<CacheState>,
}

impl<H: EnvSource + LineSource> LeapSecondCache<H> {
    pub fn new(host: H, config: TableConfig) -> Self {
        Self {
            host,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// A cache over `host` reading the default variable.
    #[inline]
    pub fn with_host(host: H) -> Self {
        Self::new(host, TableConfig::default())
    }

    #[inline]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_value(&self) -> Option<String> {
        self.host.var(&self.config.env_var).filter(|v| !v.is_empty())
    }

    fn read_table(&self, path: &str) -> Result<LeapSecondTable, TableLoadError> {
        let lines = self
            .host
            .read_lines(Path::new(path))
            .map_err(|source| TableLoadError::Io {
                path: path.into(),
                source,
            })?;
        Ok(LeapSecondTable::from_lines(lines)?.with_source(path))
    }

    fn load_into(&self, state: &mut CacheState, configured: Option<String>) {
        let table = match configured.as_deref() {
            Some(path) => match self.read_table(path) {
                Ok(table) => table,
                Err(err) => {
                    warn!(path, %err, "leap-second table rejected, using built-in table");
                    LeapSecondTable::builtin()
                }
            },
            None => LeapSecondTable::builtin(),
        };
        info!(
            provenance = ?table.provenance(),
            rows = table.row_count(),
            path = configured.as_deref().unwrap_or(""),
            "leap-second table loaded"
        );
        state.table = Some(Arc::new(table));
        state.configured = configured;
    }

    /// Reloads when the live variable differs from the one the current table
    /// was loaded under. Returns whether a reload happened.
    fn refresh(&self, state: &mut CacheState) -> bool {
        if state.table.is_none() {
            let live = if state.open_handles > 0 {
                state.configured.clone()
            } else {
                self.live_value()
            };
            self.load_into(state, live);
            return true;
        }
        if state.open_handles > 0 {
            debug!(open_handles = state.open_handles, "leap-second reload deferred");
            return false;
        }
        let live = self.live_value();
        if live == state.configured {
            return false;
        }
        debug!(
            from = state.configured.as_deref().unwrap_or(""),
            to = live.as_deref().unwrap_or(""),
            "leap-second table variable changed"
        );
        self.load_into(state, live);
        true
    }

    /// The live table, loading or reloading it first when needed.
    pub fn table(&self) -> Arc<LeapSecondTable> {
        let mut state = self.lock();
        self.refresh(&mut state);
        match &state.table {
            Some(table) => Arc::clone(table),
            None => Arc::new(LeapSecondTable::builtin()),
        }
    }

    /// Applies a pending variable change now. Returns whether the table was
    /// (re)loaded; always `false` while handles are open.
    pub fn reload_if_changed(&self) -> bool {
        let mut state = self.lock();
        if state.open_handles > 0 {
            debug!(open_handles = state.open_handles, "leap-second reload deferred");
            return false;
        }
        self.refresh(&mut state)
    }

    /// Drops the cached table unless handles are open.
    pub fn clear(&self) {
        let mut state = self.lock();
        Self::clear_locked(&mut state);
    }

    fn clear_locked(state: &mut CacheState) {
        if state.open_handles == 0 {
            state.table = None;
            state.configured = None;
            debug!("leap-second cache cleared");
        }
    }

    /// Pins the current table, loading it first if needed.
    pub fn retain(&self) {
        let mut state = self.lock();
        if state.table.is_none() {
            self.refresh(&mut state);
        }
        state.open_handles += 1;
        debug!(open_handles = state.open_handles, "leap-second handle opened");
    }

    /// Unpins the table. When the last handle goes the cache is cleared.
    pub fn release(&self) {
        let mut state = self.lock();
        state.open_handles = state.open_handles.saturating_sub(1);
        debug!(open_handles = state.open_handles, "leap-second handle closed");
        Self::clear_locked(&mut state);
    }

    /// A guard that holds the table pinned until dropped.
    pub fn open(&self) -> OpenHandle<'_, H> {
        self.retain();
        OpenHandle { cache: self }
    }

    #[inline]
    pub fn open_count(&self) -> usize {
        self.lock().open_handles
    }

    /// The table path in effect: the pinned value while handles are open,
    /// otherwise the live variable.
    pub fn configured_path(&self) -> Option<String> {
        let state = self.lock();
        if state.open_handles > 0 {
            state.configured.clone()
        } else {
            self.live_value()
        }
    }
}

/// Keeps the cache's table pinned for as long as it lives.
#[must_use = "dropping the handle releases the table immediately"]
#[derive(Debug)]
pub struct OpenHandle<'a, H: EnvSource + LineSource> {
    cache: &'a LeapSecondCache<H>,
}

impl<H: EnvSource + LineSource> OpenHandle<'_, H> {
    /// The pinned table.
    #[inline]
    pub fn table(&self) -> Arc<LeapSecondTable> {
        self.cache.table()
    }
}

impl<H: EnvSource + LineSource> Drop for OpenHandle<'_, H> {
    fn drop(&mut self) {
        self.cache.release();
    }
}

/// The process-wide cache over the real environment.
pub fn global() -> &'static LeapSecondCache<SystemHost> {
    static GLOBAL: OnceLock<LeapSecondCache<SystemHost>> = OnceLock::new();
    GLOBAL.get_or_init(|| LeapSecondCache::with_host(SystemHost))
}
