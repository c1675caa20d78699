//! The lattice operations shared by every abstract value.

/// A lattice with a least element.
///
/// `leq` is the lattice order, which is not the same as `PartialOrd` for the
/// implementing types.
pub trait Lattice: Clone + PartialEq {
    /// The least element.
    fn bottom() -> Self;

    /// Returns `true` if `self` is below or equal to `other`.
    fn leq(&self, other: &Self) -> bool;

    /// The least upper bound of `self` and `other`.
    fn join(&self, other: &Self) -> Self;

    /// The greatest lower bound of `self` and `other`.
    fn meet(&self, other: &Self) -> Self;

    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }
}

/// A lattice whose elements stand for sets of concrete values of type `T`.
pub trait Abstraction<T>: Lattice {
    /// The best abstraction of a finite set of concrete values.
    fn abstract_set<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>;

    /// Returns `true` if `value` is in the concretization of `self`.
    fn contains(&self, value: &T) -> bool;
}

/// Checks the lattice laws for a sample of elements.
#[cfg(test)]
pub(crate) fn check_lattice_laws<L: Lattice + std::fmt::Debug>(elements: &[L]) {
    for a in elements {
        assert!(L::bottom().leq(a), "bottom is not below {:?}", a);
        assert!(a.leq(a));
        assert_eq!(a.join(a), *a);
        assert_eq!(a.meet(a), *a);
        assert_eq!(a.join(&L::bottom()), *a);
        assert!(a.meet(&L::bottom()).is_bottom());

        for b in elements {
            let join = a.join(b);
            let meet = a.meet(b);

            assert_eq!(join, b.join(a), "join of {:?} and {:?}", a, b);
            assert_eq!(meet, b.meet(a), "meet of {:?} and {:?}", a, b);
            assert!(a.leq(&join) && b.leq(&join), "{:?} | {:?} = {:?}", a, b, join);
            assert!(meet.leq(a) && meet.leq(b), "{:?} & {:?} = {:?}", a, b, meet);
            assert_eq!(a.leq(b), join == *b);

            for c in elements {
                assert_eq!(a.join(&b.join(c)), a.join(b).join(c));
                if a.leq(b) {
                    assert!(a.join(c).leq(&b.join(c)));
                }
            }
        }
    }
}
