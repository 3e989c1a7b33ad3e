//! OverloadCatalog - immutable name to overload list mapping.
//!
//! The catalog is built once by a [`CatalogBuilder`] and then shared
//! read-only (typically behind an `Arc`) by every resolver.
//!
//! # Ordering
//!
//! Overloads keep registration order. When two candidates score the same,
//! the earlier one wins, so registration order is part of a catalog's
//! behavior.
//!
//! # Name validation
//!
//! Names that are SQL control symbols, or that contain a space or a quote,
//! are rejected at registration. Operators are ordinary names; the catalog
//! additionally remembers which names are operators so that diagnostics can
//! be phrased as `a + b` rather than `+(a, b)`.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use sqlfn_core::RegistrationError;

use crate::factory::FunctionFactory;
use crate::signature::SignatureDescriptor;

/// Symbols the SQL lexer treats as structure; never valid function names.
pub const SQL_CONTROL_SYMBOLS: &[&str] = &["(", ")", ",", ";", "/*", "*/", "--", "[", "]"];

/// Characters that may not appear in a function name.
pub const INVALID_NAME_CHARS: &[char] = &[' ', '"', '\''];

/// Operator tokens known to the SQL parser.
pub const DEFAULT_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "!=", "<>", "<", "<=", ">", ">=", "||", "~", "!~", "&", "|",
    "^", "and", "or", "not", "like", "ilike", "in", "between", "within", "::",
];

/// Read-only overload catalog.
#[derive(Debug, Default)]
pub struct OverloadCatalog {
    /// Lower-cased name to overloads in registration order.
    overloads: FxHashMap<String, Vec<SignatureDescriptor>>,
    operators: FxHashSet<String>,
}

impl OverloadCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Overloads registered under `name` (case-insensitive).
    pub fn overloads(&self, name: &str) -> Option<&[SignatureDescriptor]> {
        self.overloads
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.overloads.contains_key(&name.to_ascii_lowercase())
    }

    /// Whether `name` is an operator token.
    pub fn is_operator(&self, name: &str) -> bool {
        self.operators.contains(&name.to_ascii_lowercase())
    }

    /// Whether `name` has an overload taking no arguments at all.
    pub fn has_no_arg_function(&self, name: &str) -> bool {
        self.overloads(name).is_some_and(|overloads| {
            overloads
                .iter()
                .any(|d| d.fixed_arg_count() == 0 && !d.is_variadic())
        })
    }

    /// Number of distinct function names.
    pub fn function_count(&self) -> usize {
        self.overloads.len()
    }

    /// Number of registered overloads across all names.
    pub fn signature_count(&self) -> usize {
        self.overloads.values().map(Vec::len).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.overloads.keys().map(String::as_str)
    }
}

/// Builder for [`OverloadCatalog`].
#[derive(Debug)]
pub struct CatalogBuilder {
    overloads: FxHashMap<String, Vec<SignatureDescriptor>>,
    operators: FxHashSet<String>,
    invalid_names: FxHashSet<String>,
}

impl CatalogBuilder {
    /// A builder seeded with [`DEFAULT_OPERATORS`] and the control-symbol
    /// blacklist.
    pub fn new() -> Self {
        Self {
            overloads: FxHashMap::default(),
            operators: DEFAULT_OPERATORS.iter().map(|s| s.to_string()).collect(),
            invalid_names: SQL_CONTROL_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Register one factory. Its overload is appended after existing ones
    /// of the same name.
    pub fn register(
        &mut self,
        factory: Arc<dyn FunctionFactory>,
    ) -> Result<&mut Self, RegistrationError> {
        let descriptor = SignatureDescriptor::new(factory)?;
        if !self.is_valid_name(descriptor.name()) {
            return Err(RegistrationError::InvalidFunctionName(
                descriptor.name().to_string(),
            ));
        }
        self.overloads
            .entry(descriptor.name().to_string())
            .or_default()
            .push(descriptor);
        Ok(self)
    }

    /// Register every factory in order.
    pub fn register_all(
        &mut self,
        factories: impl IntoIterator<Item = Arc<dyn FunctionFactory>>,
    ) -> Result<&mut Self, RegistrationError> {
        for factory in factories {
            self.register(factory)?;
        }
        Ok(self)
    }

    /// Declare an extra operator token.
    pub fn operator(&mut self, token: &str) -> &mut Self {
        self.operators.insert(token.to_ascii_lowercase());
        self
    }

    /// Forbid a name in addition to the control symbols.
    pub fn forbid_name(&mut self, name: &str) -> &mut Self {
        self.invalid_names.insert(name.to_ascii_lowercase());
        self
    }

    pub fn is_valid_name(&self, name: &str) -> bool {
        !name.is_empty()
            && !self.invalid_names.contains(&name.to_ascii_lowercase())
            && !name.contains(INVALID_NAME_CHARS)
    }

    pub fn build(self) -> OverloadCatalog {
        OverloadCatalog {
            overloads: self.overloads,
            operators: self.operators,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
