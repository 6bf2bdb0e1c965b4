/* ************************************************************************ **
** This file is part of spgr, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of spgr is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

use std::fmt;
use std::ops::{Deref, DerefMut};

/// A 3-dimensional row vector.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct V3<X = f64>(pub [X; 3]);

/// A dense matrix with 3 rows.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct M3<V>(pub [V; 3]);

/// A square dense 3x3 matrix.
pub type M33<X = f64> = M3<V3<X>>;

macro_rules! impl_array_like {
    ($Cn:ident) => {
        impl<X> Deref for $Cn<X> {
            type Target = [X; 3];

            #[inline(always)]
            fn deref(&self) -> &Self::Target
            { &self.0 }
        }

        impl<X> DerefMut for $Cn<X> {
            #[inline(always)]
            fn deref_mut(&mut self) -> &mut Self::Target
            { &mut self.0 }
        }

        impl<'a, X> IntoIterator for &'a $Cn<X> {
            type Item = &'a X;
            type IntoIter = std::slice::Iter<'a, X>;

            #[inline(always)]
            fn into_iter(self) -> Self::IntoIter
            { self.0.iter() }
        }

        impl<'a, X> IntoIterator for &'a mut $Cn<X> {
            type Item = &'a mut X;
            type IntoIter = std::slice::IterMut<'a, X>;

            #[inline(always)]
            fn into_iter(self) -> Self::IntoIter
            { self.0.iter_mut() }
        }

        // Forward Debug to the backing array, without a wrapping "V3(...)".
        impl<X: fmt::Debug> fmt::Debug for $Cn<X> {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
            { fmt::Debug::fmt(&self.0, f) }
        }
    };
}

impl_array_like!{V3}
impl_array_like!{M3}

impl<X> V3<X> {
    #[inline]
    pub fn map<Y>(self, f: impl FnMut(X) -> Y) -> V3<Y> {
        let [a, b, c] = self.0;
        let mut f = f;
        V3([f(a), f(b), f(c)])
    }

    #[inline]
    pub fn try_map<Y, E>(self, f: impl FnMut(X) -> Result<Y, E>) -> Result<V3<Y>, E> {
        let [a, b, c] = self.0;
        let mut f = f;
        Ok(V3([f(a)?, f(b)?, f(c)?]))
    }

    #[inline]
    pub fn from_fn(f: impl FnMut(usize) -> X) -> V3<X> {
        let mut f = f;
        V3([f(0), f(1), f(2)])
    }
}

impl<X: Copy> M33<X> {
    /// Map a function over all nine elements.
    #[inline]
    pub fn map<Y>(&self, f: impl FnMut(X) -> Y) -> M33<Y> {
        let mut f = f;
        M3([
            V3::from_fn(|c| f(self.0[0][c])),
            V3::from_fn(|c| f(self.0[1][c])),
            V3::from_fn(|c| f(self.0[2][c])),
        ])
    }

    /// Transpose.
    #[inline]
    pub fn t(&self) -> M33<X>
    { M3([
        V3::from_fn(|r| self.0[r][0]),
        V3::from_fn(|r| self.0[r][1]),
        V3::from_fn(|r| self.0[r][2]),
    ]) }
}

impl<V> M3<V> {
    #[inline]
    pub fn from_fn(f: impl FnMut(usize) -> V) -> M3<V> {
        let mut f = f;
        M3([f(0), f(1), f(2)])
    }
}
