//! Operation System Module
//!
//! Provides the `Operation` strategy trait, the static plugin catalogue and
//! the registry that turns the catalogue into named, invocable operations.

mod arithmetic;
mod statistics;
pub mod isolated;

pub use arithmetic::{Add, Divide, Multiply, Subtract};
pub use statistics::{Mean, Median, Mode};
pub use isolated::IsolatedExecutor;

use crate::error::{CalcError, CalcResult, PluginLoadError};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Sender half handed to an operation running in an isolated worker
pub type ResultSender = oneshot::Sender<CalcResult<Decimal>>;

/// A named, pure binary function over two exact decimals
pub trait Operation: Send + Sync {
    /// Registry key, lower-case (e.g. "add")
    fn name(&self) -> &str;

    /// One-line description shown in the operations menu
    fn description(&self) -> &str;

    /// Compute the result in the caller's context
    fn execute(&self, a: Decimal, b: Decimal) -> CalcResult<Decimal>;

    /// Compute the result inside an isolated worker and deliver it on `tx`.
    ///
    /// Must produce exactly what `execute` produces for the same inputs.
    fn execute_isolated(&self, a: Decimal, b: Decimal, tx: ResultSender) {
        // The receiver only disappears if the caller gave up; nothing to report.
        let _ = tx.send(self.execute(a, b));
    }
}

/// Parse a user-supplied operand into an exact decimal.
///
/// Accepts plain literals (`-12.50`) and scientific notation (`1.5e3`).
/// A literal that cannot be held without rounding is rejected.
pub fn parse_decimal(raw: &str) -> CalcResult<Decimal> {
    let trimmed = raw.trim();
    let invalid = || CalcError::InvalidNumber { input: raw.to_string() };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    }
    .map_err(|_| invalid())?;

    let mantissa = parsed.normalize().mantissa().unsigned_abs().to_string();
    let literal = trimmed.split(['e', 'E']).next().unwrap_or_default();
    if significant_digits(&mantissa) != significant_digits(literal) {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Digits of a literal without sign, point, or leading and trailing zeros.
fn significant_digits(literal: &str) -> String {
    let digits: String = literal.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').trim_end_matches('0').to_string()
}

/// Constructor for one catalogue entry
pub type PluginLoader = fn() -> Result<Arc<dyn Operation>, PluginLoadError>;

/// A discoverable operation implementation: its declared key and how to build it
#[derive(Clone, Copy)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub load: PluginLoader,
}

impl PluginDescriptor {
    pub const fn new(name: &'static str, load: PluginLoader) -> Self {
        Self { name, load }
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor").field("name", &self.name).finish()
    }
}

fn instantiate<T: Operation + Default + 'static>() -> Result<Arc<dyn Operation>, PluginLoadError> {
    Ok(Arc::new(T::default()))
}

/// The fixed plugin location: every operation shipped with the calculator,
/// in discovery order.
static BUILTIN_PLUGINS: &[PluginDescriptor] = &[
    PluginDescriptor::new("add", instantiate::<Add>),
    PluginDescriptor::new("subtract", instantiate::<Subtract>),
    PluginDescriptor::new("multiply", instantiate::<Multiply>),
    PluginDescriptor::new("divide", instantiate::<Divide>),
    PluginDescriptor::new("mean", instantiate::<Mean>),
    PluginDescriptor::new("median", instantiate::<Median>),
    PluginDescriptor::new("mode", instantiate::<Mode>),
];

pub fn builtin_catalogue() -> &'static [PluginDescriptor] {
    BUILTIN_PLUGINS
}

/// Registry mapping operation keys to operation instances, in discovery order
#[derive(Default)]
pub struct OperationRegistry {
    operations: Vec<(String, Arc<dyn Operation>)>,
    failures: Vec<PluginLoadError>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every operation from the built-in catalogue
    pub fn discover() -> Self {
        Self::from_catalogue(builtin_catalogue())
    }

    /// Load operations from an arbitrary catalogue.
    ///
    /// A broken entry is logged, remembered in `load_failures` and skipped;
    /// the remaining entries still load.
    pub fn from_catalogue(catalogue: &[PluginDescriptor]) -> Self {
        let mut registry = Self::new();

        for descriptor in catalogue {
            match Self::load_plugin(descriptor) {
                Ok(op) => {
                    info!("Plugin loaded: {}", descriptor.name);
                    registry.insert(descriptor.name.to_string(), op);
                }
                Err(e) => {
                    error!("{}", e);
                    registry.failures.push(e);
                }
            }
        }

        debug!(
            "Registry ready with {} operations ({} failed)",
            registry.operations.len(),
            registry.failures.len()
        );
        registry
    }

    fn load_plugin(descriptor: &PluginDescriptor) -> Result<Arc<dyn Operation>, PluginLoadError> {
        let op = (descriptor.load)()?;
        if op.name() != descriptor.name {
            return Err(PluginLoadError::new(
                descriptor.name,
                format!("implementation declares name '{}'", op.name()),
            ));
        }
        Ok(op)
    }

    /// Register an operation instance under its own name
    pub fn register_instance<T: Operation + 'static>(&mut self, op: T) {
        self.insert(op.name().to_string(), Arc::new(op));
    }

    /// Last registration for a key wins, keeping the key's original position.
    fn insert(&mut self, key: String, op: Arc<dyn Operation>) {
        if let Some(slot) = self.operations.iter_mut().find(|(k, _)| *k == key) {
            warn!("Operation '{}' registered twice; keeping the later one", key);
            slot.1 = op;
        } else {
            self.operations.push((key, op));
        }
    }

    /// Get a specific operation by its exact (case-sensitive) key
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn Operation>> {
        self.operations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, op)| op.clone())
    }

    /// All operation keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.operations.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Catalogue entries that failed to load during discovery
    pub fn load_failures(&self) -> &[PluginLoadError] {
        &self.failures
    }

    /// Human-readable operations menu
    pub fn menu(&self) -> String {
        if self.operations.is_empty() {
            return "No operations available.\n".to_string();
        }

        let mut menu = String::from("Available operations:\n");
        for (key, op) in &self.operations {
            menu.push_str(&format!("- {}: {}\n", key, op.description()));
        }
        menu
    }
}
