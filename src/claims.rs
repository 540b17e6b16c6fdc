use std::collections::HashMap;
use std::hash::Hash;

/// How an external element is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Being approached.
    Pending,
    /// Lifted and following the hand.
    Carried,
}

/// Exclusive-ownership registry for page elements. An element appears here
/// at most once; discovery and approach logic check it before touching one.
#[derive(Debug, Clone)]
pub struct Claims<E> {
    held: HashMap<E, Claim>,
}

impl<E: Copy + Eq + Hash> Claims<E> {
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
        }
    }

    /// Claim an unclaimed element. Returns false if someone already holds it.
    pub fn try_claim(&mut self, element: E, claim: Claim) -> bool {
        if self.held.contains_key(&element) {
            return false;
        }
        self.held.insert(element, claim);
        true
    }

    pub fn release(&mut self, element: E) -> Option<Claim> {
        self.held.remove(&element)
    }

    pub fn get(&self, element: E) -> Option<Claim> {
        self.held.get(&element).copied()
    }

    pub fn is_claimed(&self, element: E) -> bool {
        self.held.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl<E: Copy + Eq + Hash> Default for Claims<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_exclusive() {
        let mut claims = Claims::new();
        assert!(claims.try_claim(7u32, Claim::Pending));
        assert!(!claims.try_claim(7u32, Claim::Pending));
        assert!(!claims.try_claim(7u32, Claim::Carried));
        assert_eq!(claims.get(7), Some(Claim::Pending));
        assert_eq!(claims.len(), 1);
        assert_eq!(claims.release(7), Some(Claim::Pending));
        assert!(claims.try_claim(7, Claim::Pending));
    }
}
