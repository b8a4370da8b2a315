//! Operator registry
//!
//! Provides [`OperatorRegistry`], mapping operator names to their declared
//! return type and argument slots, and the process-wide [`standard`] table.

use crate::slot::{AllowedType, SlotSpec};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use survey_model::ReturnType;

/// Number of arguments an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arity {
    pub min: usize,
    /// `None` when a list slot makes the count unbounded
    pub max: Option<usize>,
}

impl Arity {
    /// Check an argument count
    #[inline]
    #[must_use]
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Declaration of one operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDef {
    pub name: String,
    pub return_type: ReturnType,
    pub slots: Vec<SlotSpec>,
}

impl OperatorDef {
    /// Operator without slots
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            return_type,
            slots: Vec::new(),
        }
    }

    /// Builder: append a slot
    #[must_use]
    pub fn slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    /// Accepted argument count
    #[must_use]
    pub fn arity(&self) -> Arity {
        let min = self.slots.iter().filter(|s| s.required).count();
        let max = if self.slots.iter().any(|s| s.is_list_slot) {
            None
        } else {
            Some(self.slots.len())
        };
        Arity { min, max }
    }

    /// Slot governing the argument at `index`
    ///
    /// Arguments past the fixed slots fall into a trailing list slot.
    #[must_use]
    pub fn slot_for(&self, index: usize) -> Option<&SlotSpec> {
        match self.slots.get(index) {
            Some(slot) => Some(slot),
            None => self.slots.last().filter(|s| s.is_list_slot),
        }
    }
}

/// Registry of known operators, in registration order
#[derive(Debug, Default, Clone)]
pub struct OperatorRegistry {
    operators: IndexMap<String, OperatorDef>,
}

impl OperatorRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            operators: IndexMap::new(),
        }
    }

    /// Create registry with the standard operators
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for def in standard_operators() {
            registry.register(def);
        }
        registry
    }

    /// Register (or replace) an operator
    pub fn register(&mut self, def: OperatorDef) {
        self.operators.insert(def.name.clone(), def);
    }

    /// Look up an operator
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OperatorDef> {
        self.operators.get(name)
    }

    /// Check if operator exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.operators.keys().map(String::as_str).collect()
    }

    /// Number of registered operators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Iterate over all operators
    pub fn iter(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.values()
    }
}

static STANDARD: Lazy<OperatorRegistry> = Lazy::new(OperatorRegistry::with_defaults);

/// Shared, immutable standard registry
#[must_use]
pub fn standard() -> &'static OperatorRegistry {
    &STANDARD
}

fn standard_operators() -> Vec<OperatorDef> {
    use ReturnType::{Action, Boolean, Numeric, String as Str};

    let boolean_exp = || vec![AllowedType::exp(&[Boolean])];
    let comparable = || {
        vec![
            AllowedType::num(),
            AllowedType::str(),
            AllowedType::exp(&[Numeric, Str]),
        ]
    };
    let item_ref = || SlotSpec::required("item", vec![AllowedType::value_ref()]);
    let compare = |name: &str| {
        OperatorDef::new(name, Boolean)
            .slot(SlotSpec::required("left", comparable()))
            .slot(SlotSpec::required("right", comparable()))
    };
    let key_query = |name: &str| {
        OperatorDef::new(name, Boolean)
            .slot(item_ref())
            .slot(SlotSpec::list("keys", true, vec![AllowedType::str()]))
    };

    vec![
        // Logic
        OperatorDef::new("and", Boolean).slot(SlotSpec::list("operands", true, boolean_exp())),
        OperatorDef::new("or", Boolean).slot(SlotSpec::list("operands", true, boolean_exp())),
        OperatorDef::new("not", Boolean).slot(SlotSpec::required("operand", boolean_exp())),
        // Comparison
        compare("eq"),
        compare("lt"),
        compare("lte"),
        compare("gt"),
        compare("gte"),
        // Response queries
        OperatorDef::new("isDefined", Boolean).slot(item_ref()),
        OperatorDef::new("hasResponse", Boolean).slot(item_ref()),
        key_query("responseHasKeysAny"),
        key_query("responseHasKeysAll"),
        key_query("responseHasOnlyKeysOtherThan"),
        OperatorDef::new("getResponseValueAsNum", Numeric).slot(item_ref()),
        OperatorDef::new("getResponseValueAsStr", Str).slot(item_ref()),
        OperatorDef::new("countResponseItems", Numeric).slot(item_ref()),
        OperatorDef::new("checkResponseValueWithRegex", Boolean)
            .slot(item_ref())
            .slot(SlotSpec::required("pattern", vec![AllowedType::str()])),
        OperatorDef::new("timestampWithOffset", Numeric)
            .slot(SlotSpec::required(
                "offset",
                vec![AllowedType::num(), AllowedType::exp(&[Numeric])],
            ))
            .slot(SlotSpec::optional(
                "reference",
                vec![AllowedType::num(), AllowedType::exp(&[Numeric])],
            )),
        // Actions
        OperatorDef::new("IF", Action)
            .slot(SlotSpec::required("condition", boolean_exp()))
            .slot(SlotSpec::required("then", vec![AllowedType::exp(&[Action])]))
            .slot(SlotSpec::optional("else", vec![AllowedType::exp(&[Action])])),
        OperatorDef::new("UPDATE_FLAG", Action)
            .slot(SlotSpec::required("flag", vec![AllowedType::str()]))
            .slot(SlotSpec::required(
                "value",
                vec![AllowedType::str(), AllowedType::num(), AllowedType::exp(&[Str, Numeric])],
            )),
        OperatorDef::new("REMOVE_FLAG", Action)
            .slot(SlotSpec::required("flag", vec![AllowedType::str()])),
        OperatorDef::new("ADD_NEW_SURVEY", Action)
            .slot(SlotSpec::required("survey", vec![AllowedType::str()]))
            .slot(SlotSpec::required("category", vec![AllowedType::str()]))
            .slot(SlotSpec::optional(
                "activeFrom",
                vec![AllowedType::num(), AllowedType::exp(&[Numeric])],
            ))
            .slot(SlotSpec::optional(
                "activeUntil",
                vec![AllowedType::num(), AllowedType::exp(&[Numeric])],
            )),
        OperatorDef::new("REMOVE_SURVEYS_BY_KEY", Action)
            .slot(SlotSpec::required("survey", vec![AllowedType::str()]))
            .slot(SlotSpec::required("which", vec![AllowedType::str()])),
    ]
}
