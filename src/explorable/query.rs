/// Explorable Query System
///
/// Filtering of registry slots by type, occupancy and reset state.
/// Uses a bitset over slot indices so combined filters never allocate
/// per-slot intermediate results.
use super::explorable_data::{ExplorableId, ExplorableStorage};
use bit_vec::BitVec;

/// Query filter conditions
#[derive(Debug, Clone)]
pub enum QueryFilter {
    /// Filter by blueprint type
    Type(String),
    /// Filter by multiple blueprint types
    TypeIn(Vec<String>),
    /// Filter by whether any player is inside
    Occupied(bool),
    /// Reset deadline passed at the given epoch milliseconds
    ResetDue(i64),
    /// Combine filters with AND
    And(Box<QueryFilter>, Box<QueryFilter>),
    /// Combine filters with OR
    Or(Box<QueryFilter>, Box<QueryFilter>),
    /// Negate a filter
    Not(Box<QueryFilter>),
}

/// Query builder for fluent API
#[derive(Debug, Default)]
pub struct ExplorableQuery {
    filters: Vec<QueryFilter>,
}

impl ExplorableQuery {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn with_type(mut self, explorable_type: impl Into<String>) -> Self {
        self.filters.push(QueryFilter::Type(explorable_type.into()));
        self
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.filters.push(QueryFilter::TypeIn(types));
        self
    }

    /// Only explorables with players inside
    pub fn occupied(mut self) -> Self {
        self.filters.push(QueryFilter::Occupied(true));
        self
    }

    /// Only empty explorables
    pub fn empty(mut self) -> Self {
        self.filters.push(QueryFilter::Occupied(false));
        self
    }

    pub fn reset_due(mut self, now_ms: i64) -> Self {
        self.filters.push(QueryFilter::ResetDue(now_ms));
        self
    }

    /// Build final filter
    pub fn build(self) -> Option<QueryFilter> {
        let mut iter = self.filters.into_iter();
        iter.next().map(|first| {
            iter.fold(first, |acc, filter| {
                QueryFilter::And(Box::new(acc), Box::new(filter))
            })
        })
    }
}

/// Query result
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Matching live explorables, ascending
    pub ids: Vec<ExplorableId>,
    /// Slots checked (live and vacant)
    pub total_checked: usize,
}

/// Run `filter` over every live explorable
pub fn execute_query(storage: &ExplorableStorage, filter: Option<&QueryFilter>) -> QueryResult {
    let total = storage.explorables.len();
    let mut matches = BitVec::from_elem(total, true);

    for (i, entry) in storage.explorables.iter().enumerate() {
        if entry.is_none() {
            matches.set(i, false);
        }
    }

    if let Some(f) = filter {
        apply_filter(storage, f, &mut matches);
    }

    let ids = matches
        .iter()
        .enumerate()
        .filter_map(|(i, matched)| matched.then_some(ExplorableId(i as u32)))
        .collect();

    QueryResult {
        ids,
        total_checked: total,
    }
}

/// Clear bits of slots that fail `filter`
fn apply_filter(storage: &ExplorableStorage, filter: &QueryFilter, matches: &mut BitVec) {
    match filter {
        QueryFilter::Type(t) => retain(storage, matches, |e| &e.explorable_type == t),
        QueryFilter::TypeIn(types) => retain(storage, matches, |e| types.contains(&e.explorable_type)),
        QueryFilter::Occupied(occupied) => retain(storage, matches, |e| e.is_occupied() == *occupied),
        QueryFilter::ResetDue(now_ms) => retain(storage, matches, |e| e.reset_elapsed(*now_ms)),

        QueryFilter::And(a, b) => {
            apply_filter(storage, a, matches);
            apply_filter(storage, b, matches);
        }

        QueryFilter::Or(a, b) => {
            let mut left = matches.clone();
            let mut right = matches.clone();
            apply_filter(storage, a, &mut left);
            apply_filter(storage, b, &mut right);
            left.or(&right);
            matches.and(&left);
        }

        QueryFilter::Not(inner) => {
            let mut negated = matches.clone();
            apply_filter(storage, inner, &mut negated);
            negated.negate();
            matches.and(&negated);
        }
    }
}

fn retain<F>(storage: &ExplorableStorage, matches: &mut BitVec, keep: F)
where
    F: Fn(&super::explorable_data::Explorable) -> bool,
{
    for (i, entry) in storage.explorables.iter().enumerate() {
        if let Some(explorable) = entry {
            if !keep(explorable) {
                matches.set(i, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorable::explorable_data::Explorable;

    fn storage() -> ExplorableStorage {
        let make = |t: &str, count: u32, reset_at: Option<i64>| {
            Some(Explorable {
                explorable_type: t.to_string(),
                grid_x: 0,
                grid_y: 0,
                entrance_x: 0,
                entrance_y: 0,
                exit_to_x: 0,
                exit_to_y: 0,
                player_count: count,
                reset_at,
            })
        };
        ExplorableStorage {
            explorables: vec![
                make("cave", 0, Some(100)),
                None,
                make("cave", 2, Some(50)),
                make("crypt", 0, None),
                make("crypt", 0, Some(500)),
            ],
            unused: vec![ExplorableId(1)],
            ..Default::default()
        }
    }

    #[test]
    fn test_query_builder() {
        let query = ExplorableQuery::new().with_type("cave").occupied().build();
        assert!(matches!(query, Some(QueryFilter::And(_, _))));
        assert!(ExplorableQuery::new().build().is_none());
    }

    #[test]
    fn test_unfiltered_returns_live_only() {
        let result = execute_query(&storage(), None);
        assert_eq!(result.total_checked, 5);
        assert_eq!(
            result.ids,
            vec![ExplorableId(0), ExplorableId(2), ExplorableId(3), ExplorableId(4)]
        );
    }

    #[test]
    fn test_reset_due_and_empty() {
        let filter = ExplorableQuery::new().empty().reset_due(200).build();
        let result = execute_query(&storage(), filter.as_ref());
        assert_eq!(result.ids, vec![ExplorableId(0)]);
    }

    #[test]
    fn test_or_and_not() {
        let filter = QueryFilter::Or(
            Box::new(QueryFilter::Occupied(true)),
            Box::new(QueryFilter::Not(Box::new(QueryFilter::Type("cave".to_string())))),
        );
        let result = execute_query(&storage(), Some(&filter));
        assert_eq!(result.ids, vec![ExplorableId(2), ExplorableId(3), ExplorableId(4)]);
    }
}
