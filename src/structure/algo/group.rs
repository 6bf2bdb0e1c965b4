use std::collections::HashMap;
use std::hash::Hash;
use std::result::Result as StdResult;

// NOTE: There is deliberately no "group" trait.  Most groups here depend on
// context (a lattice, a tolerance) which is awkward in a trait but trivial
// in a closure, and a type may have more than one sensible group operation.

/// Tree representation of a finite group, with generators as leaves.
///
/// Built once from a full member list, it lets an expensive function be
/// evaluated on only a handful of members, with everything else obtained
/// through cheap composition.
pub(crate) struct GroupTree<G> {
    members: Vec<G>,
    decomps: Vec<Option<(usize, usize)>>,
}

impl<G> GroupTree<G>
{
    /// Constructs a `GroupTree<G>` given a sequence that contains
    /// each member of a finite group exactly once.
    ///
    /// The tree is guaranteed to order its elements in the same order
    /// as the input `Vec`.
    ///
    /// In line with the library's row-centric design, arguments of the
    /// closure are flipped from the typical mathematical convention;
    /// `compose(a, b)` should perform *`a` followed by `b`*.
    pub fn from_all_members(
        members: Vec<G>,
        mut compose: impl FnMut(&G, &G) -> G,
    ) -> Self
    where G: Hash + Eq + Clone,
    {
        assert!(!members.is_empty(), "empty groups do not exist!");

        let indices: HashMap<G, usize> =
            members.iter().cloned()
            .enumerate().map(|(i, x)| (x, i))
            .collect();

        // Brute force O(G)^2 attempt to fill the tree.  Good enough for
        // groups bounded by the 48-element point group limit.
        //
        // A product that falls outside the member list is ignored rather
        // than treated as an error; the corresponding member simply stays
        // a leaf.  (tolerance scans can hand us sets that are not quite
        // closed at the boundary)
        let mut decomps = vec![None; members.len()];
        for a in 0..members.len() {
            for b in 0..=a {
                if let Some(&c) = indices.get(&compose(&members[a], &members[b])) {
                    if c > a {
                        decomps[c] = Some((a, b));
                    }
                }
            }
        }
        GroupTree { members, decomps }
    }

    /// Compute a homomorphism of a group using the tree
    /// to elide expensive computations.
    ///
    /// Ideally, `compute` should be a function that is very expensive to
    /// compute, while `compose` should be comparatively cheaper.
    ///
    /// `compose(a, b)` should compute `b of a`.
    pub fn try_compute_homomorphism<E, H>(
        &self,
        mut compute: impl FnMut(usize, &G) -> StdResult<H, E>,
        mut compose: impl FnMut(&H, &H) -> StdResult<H, E>,
    ) -> StdResult<Vec<H>, E>
    {Ok({
        let len = self.members.len();
        let mut out = Vec::with_capacity(len);

        for (index, g, decomp) in izip!(0..len, &self.members, &self.decomps) {
            let value = match *decomp {
                None => compute(index, g)?,
                Some((a, b)) => compose(&out[a], &out[b])?,
            };
            out.push(value);
        }
        out
    })}
}

/// Generates a finite group from a non-empty set of generators.
///
/// The generators may contain duplicates or extraneous elements.
///
/// The order of the output is arbitrary, but consistent for
/// inputs that are related by a group isomorphism.
pub(crate) fn generate_finite_group<G>(
    generators: &[G],
    mut g_fn: impl FnMut(&G, &G) -> G,
) -> Vec<G>
where G: Hash + Eq + Clone,
{
    use std::collections::{HashSet, VecDeque};
    assert!(!generators.is_empty(), "empty groups do not exist!");

    let mut seen = HashSet::new();
    let mut out = vec![];

    let mut queue: VecDeque<_> = generators.iter().cloned().collect();

    while let Some(g) = queue.pop_front() {
        if seen.insert(g.clone()) {
            queue.extend(generators.iter().map(|h| g_fn(&g, h)));
            out.push(g);
        }
    }
    out
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    // Z/6 under addition, as a stand-in group with obvious structure.
    #[test]
    fn homomorphism_calls_compute_rarely() {
        let members: Vec<u32> = (0..6).collect();
        let tree = GroupTree::from_all_members(members, |a, b| (a + b) % 6);

        let mut expensive_calls = 0;
        let doubled = tree.try_compute_homomorphism(
            |_, &g| -> Result<u32, ()> {
                expensive_calls += 1;
                Ok((2 * g) % 12)
            },
            |&a, &b| Ok((a + b) % 12),
        ).unwrap();

        assert_eq!(doubled, vec![0, 2, 4, 6, 8, 10]);
        assert!(expensive_calls <= 2);
    }

    #[test]
    fn generation_from_generators() {
        // the cyclic group generated by rotation-by-90
        let gen = vec![(0i32, -1i32, 1i32, 0i32)];
        let mul = |a: &(i32, i32, i32, i32), b: &(i32, i32, i32, i32)| (
            a.0 * b.0 + a.1 * b.2,
            a.0 * b.1 + a.1 * b.3,
            a.2 * b.0 + a.3 * b.2,
            a.2 * b.1 + a.3 * b.3,
        );
        let group = generate_finite_group(&gen, |a, b| mul(a, b));
        assert_eq!(group.len(), 4);
    }
}
