use serde::{Deserialize, Serialize};

/// A simple cycle in the dependency graph.
///
/// Members are listed in edge order (each module is a dependency of the
/// next, wrapping around) and stored in canonical form: rotated so the
/// lexicographically smallest name comes first. Canonicalization makes
/// cycle lists comparable across runs and insertion orders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle {
    members: Vec<String>,
}

impl Cycle {
    /// Build a cycle from members in edge order, canonicalizing the rotation.
    pub fn new(members: Vec<String>) -> Self {
        let mut members = members;
        if let Some(smallest) = members
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
        {
            members.rotate_left(smallest);
        }
        Self { members }
    }

    /// Member names in canonical edge order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for member in &self.members {
            write!(f, "{member} -> ")?;
        }
        match self.members.first() {
            Some(first) => write!(f, "{first}"),
            None => write!(f, "(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(members: &[&str]) -> Cycle {
        Cycle::new(members.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn canonical_rotation_starts_at_smallest() {
        assert_eq!(cycle(&["c", "a", "b"]).members(), ["a", "b", "c"]);
        assert_eq!(cycle(&["b", "c", "a"]).members(), ["a", "b", "c"]);
    }

    #[test]
    fn rotation_preserves_edge_order() {
        // c -> b -> a -> c rotated to a, not sorted to a, b, c.
        assert_eq!(cycle(&["c", "b", "a"]).members(), ["a", "c", "b"]);
    }

    #[test]
    fn equal_cycles_compare_equal_regardless_of_rotation() {
        assert_eq!(cycle(&["b", "c", "a"]), cycle(&["a", "b", "c"]));
    }

    #[test]
    fn self_loop_display() {
        assert_eq!(cycle(&["a"]).to_string(), "a -> a");
    }

    #[test]
    fn display_closes_the_loop() {
        assert_eq!(cycle(&["a", "b"]).to_string(), "a -> b -> a");
    }
}
