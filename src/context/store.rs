//! Request-scoped variable store.
//!
//! One `RequestVariables` value travels with each request as an extension.
//! It is created when the request matches a location and dropped with the
//! request; nothing here is shared between requests.

use std::collections::HashMap;

/// How downstream stages may treat a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableFlags {
    /// Later stages may overwrite the value.
    pub changeable: bool,
    /// Readers must re-read the value instead of caching it.
    pub no_cacheable: bool,
}

impl VariableFlags {
    pub const SEEDED: Self = Self {
        changeable: false,
        no_cacheable: false,
    };

    pub const DYNAMIC: Self = Self {
        changeable: true,
        no_cacheable: true,
    };
}

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    flags: VariableFlags,
}

#[derive(Debug, Clone, Default)]
pub struct RequestVariables {
    slots: HashMap<String, Slot>,
}

impl RequestVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded with fixed values.
    pub fn seeded<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = Self::new();
        for (name, value) in values {
            vars.set(name, value, VariableFlags::SEEDED);
        }
        vars
    }

    /// Value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(|slot| slot.value.as_str())
    }

    /// Value of `name` if set and non-empty.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn flags(&self, name: &str) -> Option<VariableFlags> {
        self.slots.get(name).map(|slot| slot.flags)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, flags: VariableFlags) {
        self.slots.insert(
            name.into(),
            Slot {
                value: value.into(),
                flags,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values() {
        let vars = RequestVariables::seeded([("epp_host", "10.0.0.1"), ("epp_port", "")]);
        assert_eq!(vars.get("epp_host"), Some("10.0.0.1"));
        assert_eq!(vars.get("epp_port"), Some(""));
        assert_eq!(vars.get_non_empty("epp_port"), None);
        assert_eq!(vars.flags("epp_host"), Some(VariableFlags::SEEDED));
        assert!(!vars.contains("inference_workload_endpoint"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut vars = RequestVariables::new();
        vars.set("inference_workload_endpoint", "a:1", VariableFlags::DYNAMIC);
        vars.set("inference_workload_endpoint", "b:2", VariableFlags::DYNAMIC);
        assert_eq!(vars.get("inference_workload_endpoint"), Some("b:2"));
        assert_eq!(vars.len(), 1);
        assert!(vars.flags("inference_workload_endpoint").unwrap().no_cacheable);
    }
}
