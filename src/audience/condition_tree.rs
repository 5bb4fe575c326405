use serde::{de::DeserializeOwned, ser::SerializeSeq, Serialize};

const AND: &str = "and";
const OR: &str = "or";
const NOT: &str = "not";

/// A nested boolean expression over leaves of type `L`.
///
/// Audience condition trees use [`UserCondition`](super::UserCondition) leaves; experiment
/// audience expressions use audience-id (`String`) leaves.
///
/// In the datafile, a combinator is a JSON array whose first element is `"and"`, `"or"` or
/// `"not"`. An array without a leading operator is an implicit OR.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree<L> {
    /// True iff every child is true.
    And(Vec<ConditionTree<L>>),
    /// True if any child is true.
    Or(Vec<ConditionTree<L>>),
    /// Inverts its operand. `None` when the datafile gave no operand.
    Not(Option<Box<ConditionTree<L>>>),
    /// A condition evaluated by the caller.
    Leaf(L),
    /// A node that did not parse as a leaf. Always evaluates to unknown.
    Invalid(serde_json::Value),
}

impl<L: DeserializeOwned> ConditionTree<L> {
    /// Parse a tree out of its datafile JSON representation.
    ///
    /// Parsing never fails as a whole: a node that is not a valid leaf becomes
    /// [`ConditionTree::Invalid`] and the rest of the tree is kept.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let serde_json::Value::Array(items) = value else {
            return serde_json::from_value(value.clone())
                .map_or_else(|_| ConditionTree::Invalid(value.clone()), ConditionTree::Leaf);
        };

        let (operator, operands) = match items.split_first() {
            Some((serde_json::Value::String(op), rest)) if [AND, OR, NOT].contains(&op.as_str()) => {
                (op.as_str(), rest)
            }
            _ => (OR, items.as_slice()),
        };

        let mut children = operands.iter().map(Self::from_json).collect::<Vec<_>>();

        match operator {
            AND => ConditionTree::And(children),
            NOT => ConditionTree::Not(if children.is_empty() {
                None
            } else {
                Some(Box::new(children.swap_remove(0)))
            }),
            _ => ConditionTree::Or(children),
        }
    }
}

impl<L> ConditionTree<L> {
    /// Evaluate the tree with three-valued logic, where `None` stands for "unknown".
    ///
    /// Children are evaluated in order. AND stops at the first false child and OR at the first
    /// true child, so `leaf` is not called for the rest.
    pub fn evaluate<F>(&self, leaf: &mut F) -> Option<bool>
    where
        F: FnMut(&L) -> Option<bool>,
    {
        match self {
            ConditionTree::And(children) => {
                let mut saw_unknown = false;
                for child in children {
                    match child.evaluate(leaf) {
                        Some(false) => return Some(false),
                        None => saw_unknown = true,
                        Some(true) => {}
                    }
                }
                if saw_unknown {
                    None
                } else {
                    Some(true)
                }
            }
            ConditionTree::Or(children) => {
                let mut saw_unknown = false;
                for child in children {
                    match child.evaluate(leaf) {
                        Some(true) => return Some(true),
                        None => saw_unknown = true,
                        Some(false) => {}
                    }
                }
                if saw_unknown {
                    None
                } else {
                    Some(false)
                }
            }
            ConditionTree::Not(operand) => operand.as_ref()?.evaluate(leaf).map(|v| !v),
            ConditionTree::Leaf(l) => leaf(l),
            ConditionTree::Invalid(_) => None,
        }
    }
}

impl<L: Serialize> Serialize for ConditionTree<L> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (operator, children): (&str, Vec<&ConditionTree<L>>) = match self {
            ConditionTree::Leaf(l) => return l.serialize(serializer),
            ConditionTree::Invalid(value) => return value.serialize(serializer),
            ConditionTree::And(children) => (AND, children.iter().collect()),
            ConditionTree::Or(children) => (OR, children.iter().collect()),
            ConditionTree::Not(operand) => (NOT, operand.iter().map(|child| &**child).collect()),
        };
        let mut seq = serializer.serialize_seq(Some(children.len() + 1))?;
        seq.serialize_element(operator)?;
        for child in children {
            seq.serialize_element(child)?;
        }
        seq.end()
    }
}
