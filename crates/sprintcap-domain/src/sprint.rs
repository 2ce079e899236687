use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::task::SprintName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub name: SprintName,
    pub capacity: f64,
    #[serde(default)]
    pub assignee_capacities: BTreeMap<String, f64>,
}

impl Sprint {
    pub fn new(name: impl Into<SprintName>, capacity: f64) -> Self {
        Self {
            name: name.into(),
            capacity: sanitize_capacity(capacity),
            assignee_capacities: BTreeMap::new(),
        }
    }

    pub fn set_capacity(&mut self, capacity: f64) {
        self.capacity = sanitize_capacity(capacity);
    }

    /// Set one assignee's capacity. When the per-assignee total exceeds the
    /// sprint capacity, the sprint capacity grows to match. It never shrinks
    /// automatically.
    pub fn set_assignee_capacity(&mut self, assignee: impl Into<String>, capacity: f64) {
        self.assignee_capacities
            .insert(assignee.into(), sanitize_capacity(capacity));

        let allocated = self.allocated_capacity();
        if allocated > self.capacity {
            tracing::debug!(
                "Raising capacity of {} from {} to {}",
                self.name,
                self.capacity,
                allocated
            );
            self.capacity = allocated;
        }
    }

    /// Sum of all per-assignee capacities.
    pub fn allocated_capacity(&self) -> f64 {
        self.assignee_capacities.values().sum()
    }

    /// Capacity for an assignee view; falls back to the sprint total when the
    /// assignee has no explicit entry or no assignee is selected.
    pub fn effective_capacity(&self, assignee: Option<&str>) -> f64 {
        assignee
            .and_then(|name| self.assignee_capacities.get(name).copied())
            .unwrap_or(self.capacity)
    }
}

fn sanitize_capacity(capacity: f64) -> f64 {
    if capacity.is_finite() && capacity > 0.0 {
        capacity
    } else {
        0.0
    }
}

/// Numeric-aware, case-insensitive ordering: `Sprint 2` sorts before
/// `Sprint 10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let lnum = take_number(&mut left);
                let rnum = take_number(&mut right);
                let ordering = compare_digits(&lnum, &rnum);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
