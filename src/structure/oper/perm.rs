use std::fmt;

/// Represents a reordering operation on atoms.
///
/// Stored in "pull" form: if the `k`th element of the index vector is
/// `value`, then applying the permutation pulls the data at index `value`
/// into index `k` (comparable to indexing with an integer array in numpy).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Perm(Vec<usize>);

impl fmt::Debug for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug, Fail)]
#[fail(display = "tried to construct an invalid permutation")]
pub struct InvalidPermutationError(failure::Backtrace);

impl Perm {
    pub fn eye(n: usize) -> Perm
    { Perm((0..n).collect()) }

    pub fn len(&self) -> usize
    { self.0.len() }

    pub fn is_empty(&self) -> bool
    { self.0.is_empty() }

    /// The raw index vector, in pull form.
    pub fn indices(&self) -> &[usize]
    { &self.0 }

    /// Validates that the input contains each index in `0..len` exactly once.
    pub fn from_vec(vec: Vec<usize>) -> Result<Perm, InvalidPermutationError>
    {Ok({
        let mut seen = vec![false; vec.len()];
        for &x in &vec {
            if x >= vec.len() || seen[x] {
                throw!(InvalidPermutationError(failure::Backtrace::new()));
            }
            seen[x] = true;
        }
        Perm(vec)
    })}

    /// Compute the `Perm` that, when applied to the input slice, would
    /// (stably) sort it.
    pub fn argsort<T: Ord>(xs: &[T]) -> Perm {
        let mut idx: Vec<_> = (0..xs.len()).collect();
        idx.sort_by(|&a, &b| xs[a].cmp(&xs[b]));
        Perm(idx)
    }

    pub fn inverted(&self) -> Perm {
        let mut inv = vec![0; self.0.len()];
        for (k, &v) in self.0.iter().enumerate() {
            inv[v] = k;
        }
        Perm(inv)
    }

    /// Index of the slot that element `i` lands in when the perm is applied.
    pub fn destination_of(&self, i: usize) -> usize
    { self.inverted().0[i] }

    #[cfg(test)]
    pub fn random(n: usize) -> Perm {
        let mut idx: Vec<_> = (0..n).collect();
        for k in (1..n).rev() {
            let other = rand::random::<usize>() % (k + 1);
            idx.swap(k, other);
        }
        Perm(idx)
    }
}

/// Data that can be rearranged by a [`Perm`].
pub trait Permute: Sized {
    fn permuted_by(self, perm: &Perm) -> Self;
}

impl<T> Permute for Vec<T> {
    fn permuted_by(self, perm: &Perm) -> Vec<T> {
        assert_eq!(self.len(), perm.len(), "permutation length mismatch");
        let mut slots: Vec<_> = self.into_iter().map(Some).collect();
        perm.0.iter()
            .map(|&i| slots[i].take().expect("bug! (perm is not a bijection?)"))
            .collect()
    }
}

// Permutations are associative under this:
//     x.permuted_by(p).permuted_by(q) == x.permuted_by(p.permuted_by(q))
impl Permute for Perm {
    fn permuted_by(self, perm: &Perm) -> Perm
    { Perm(self.0.permuted_by(perm)) }
}
