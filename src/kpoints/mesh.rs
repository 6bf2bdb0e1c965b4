//! Uniform grids in fractional reciprocal coordinates, and their reduction
//! into symmetry orbits.

use spgr_array_types::{M33, V3};

use num_integer::Integer;

/// A uniform grid over the reciprocal unit cell.
///
/// Grid points are indexed row-major: `index = x + nx * (y + ny * z)`.
/// With a shift flag set on an axis, points sit at half-grid offsets; the
/// fractional coordinate of address `a` is `(2a + s) / (2n)` per axis
/// (the "double grid" convention, which keeps everything integral).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mesh {
    dims: [i32; 3],
    shift: [bool; 3],
}

#[derive(Debug, Fail)]
pub enum MeshError {
    #[fail(display = "mesh dimensions must be positive: {:?}", dims)]
    BadDimensions { dims: [i32; 3] },
}

impl Mesh {
    pub fn new(dims: [i32; 3], shift: [bool; 3]) -> Result<Mesh, MeshError> {
        if dims.iter().any(|&n| n < 1) {
            return Err(MeshError::BadDimensions { dims });
        }
        Ok(Mesh { dims, shift })
    }

    pub fn dims(&self) -> [i32; 3] { self.dims }
    pub fn shift(&self) -> [bool; 3] { self.shift }

    pub fn num_points(&self) -> usize
    { (self.dims[0] * self.dims[1] * self.dims[2]) as usize }

    /// Grid address of a linear index; components in `0..n`.
    pub fn address(&self, index: usize) -> V3<i32> {
        let [nx, ny, _] = self.dims;
        let index = index as i32;
        V3([index % nx, (index / nx) % ny, index / (nx * ny)])
    }

    /// Linear index of a (possibly out-of-cell) grid address.
    pub fn index_of(&self, address: &V3<i32>) -> usize {
        let [nx, ny, _] = self.dims;
        let wrapped = V3::from_fn(|k| address[k].rem_euclid(self.dims[k]));
        (wrapped[0] + nx * (wrapped[1] + ny * wrapped[2])) as usize
    }

    fn shift_int(&self) -> V3<i32>
    { V3::from_fn(|k| self.shift[k] as i32) }

    /// The double-grid address `2a + s`.
    pub fn double_address(&self, index: usize) -> V3<i32> {
        let a = self.address(index);
        let s = self.shift_int();
        V3::from_fn(|k| 2 * a[k] + s[k])
    }

    /// Fractional coordinate of a grid point.
    pub fn frac(&self, index: usize) -> V3 {
        let d = self.double_address(index);
        V3::from_fn(|k| f64::from(d[k]) / (2.0 * f64::from(self.dims[k])))
    }

    /// Apply a rotation to a grid point, staying on the integer grid.
    ///
    /// Callers must have filtered the rotation through
    /// [`Mesh::compatible_rotations`]; incompatible rotations panic here.
    pub(crate) fn rotate_index(&self, rot: &M33<i32>, index: usize) -> usize {
        let d = self.double_address(index);
        let s = self.shift_int();
        let n = self.dims;

        let big_n = i64::from(n[0]) * i64::from(n[1]) * i64::from(n[2]);
        let address = V3::from_fn(|k| {
            // d'_k = n_k * sum_j rot[k][j] d_j / n_j, exactly
            let num: i64 = (0..3)
                .map(|j| i64::from(rot[k][j]) * i64::from(d[j]) * (big_n / i64::from(n[j])))
                .sum();
            let twice = num * i64::from(n[k]);
            assert_eq!(twice % big_n, 0, "bug! (rotation not compatible with mesh)");
            let rotated_double = twice / big_n;
            let offset = rotated_double - i64::from(s[k]);
            assert_eq!(offset % 2, 0, "bug! (rotation moved the shifted grid)");
            (offset / 2) as i32
        });
        self.index_of(&address)
    }

    /// Filter (and optionally time-reversal-double) a rotation set down to
    /// the subgroup that maps this mesh onto itself.
    ///
    /// A rotation survives when every matrix element keeps the grid integral
    /// (`rot[k][j] * n_k` divisible by `n_j`) and the half-grid shift lands
    /// back on itself modulo full grid steps.  Both conditions are closed
    /// under composition, so orbits stay well-defined.
    pub(crate) fn compatible_rotations(
        &self,
        rotations: &[M33<i32>],
        time_reversal: bool,
    ) -> Vec<M33<i32>> {
        let mut set: Vec<M33<i32>> = vec![];
        for &rot in rotations {
            for &candidate in &[rot, -rot] {
                if !time_reversal && candidate != rot {
                    continue;
                }
                if !set.contains(&candidate) && self.is_compatible(&candidate) {
                    set.push(candidate);
                }
            }
        }
        if set.len() < rotations.len() {
            debug!(
                "mesh {:?} keeps {} of {} rotations",
                self.dims, set.len(), rotations.len(),
            );
        }
        set
    }

    fn is_compatible(&self, rot: &M33<i32>) -> bool {
        let n = self.dims;
        let s = self.shift_int();

        // grid stays integral under the rotation
        let integral = (0..3).all(|k| (0..3).all(|j| {
            rot[k][j] == 0 || (rot[k][j] * n[k]).is_multiple_of(&n[j])
        }));
        if !integral {
            return false;
        }

        // the shifted grid maps onto itself: parity of the rotated shift
        // must match the shift (the even `2a` part never matters)
        (0..3).all(|k| {
            let rotated: i32 = (0..3)
                .map(|j| if s[j] == 0 { 0 } else { rot[k][j] * n[k] / n[j] })
                .sum();
            (rotated - s[k]).rem_euclid(2) == 0
        })
    }
}

/// The reduction of a grid (or point list) into symmetry orbits.
///
/// `map[i]` is the representative of `i`'s orbit: the lexicographically
/// smallest index in it.  The mapping is idempotent, and orbit weights sum
/// to the total point count.
#[derive(Debug, Clone)]
pub struct IrSet {
    pub map: Vec<usize>,
}

impl IrSet {
    /// Number of distinct representatives.
    pub fn num_ir(&self) -> usize
    { self.representatives().len() }

    pub fn representatives(&self) -> Vec<usize> {
        self.map.iter().enumerate()
            .filter(|&(i, &rep)| i == rep)
            .map(|(i, _)| i)
            .collect()
    }

    /// Orbit size per point; nonzero only at representatives.
    pub fn weights(&self) -> Vec<usize> {
        let mut weights = vec![0; self.map.len()];
        for &rep in &self.map {
            weights[rep] += 1;
        }
        weights
    }
}

/// Unrestricted reduction: one representative per orbit of the full
/// rotation group (doubled by inversion when `time_reversal` is set).
pub fn ir_mesh(mesh: &Mesh, rotations: &[M33<i32>], time_reversal: bool) -> IrSet {
    let rots = mesh.compatible_rotations(rotations, time_reversal);
    reduce_with(mesh, &rots)
}

/// Stabilized reduction: rotations are first restricted to the little
/// group of the supplied q-vectors (each must map to itself modulo the
/// reciprocal lattice, within `tol`).
pub fn ir_mesh_stabilized(
    mesh: &Mesh,
    rotations: &[M33<i32>],
    time_reversal: bool,
    qpoints: &[V3],
    tol: f64,
) -> IrSet {
    let rots = mesh.compatible_rotations(rotations, time_reversal);
    let little: Vec<M33<i32>> = rots.into_iter()
        .filter(|rot| qpoints.iter().all(|q| fixes_qpoint(rot, q, tol)))
        .collect();
    reduce_with(mesh, &little)
}

pub(crate) fn fixes_qpoint(rot: &M33<i32>, q: &V3, tol: f64) -> bool {
    let rotated = rotate_frac(rot, q);
    (0..3).all(|k| {
        let d = rotated[k] - q[k];
        (d - d.round()).abs() <= tol
    })
}

pub(crate) fn rotate_frac(rot: &M33<i32>, q: &V3) -> V3 {
    V3::from_fn(|k| (0..3).map(|j| f64::from(rot[k][j]) * q[j]).sum())
}

fn reduce_with(mesh: &Mesh, rotations: &[M33<i32>]) -> IrSet {
    let n = mesh.num_points();
    let mut map = Vec::with_capacity(n);
    for i in 0..n {
        let rep = rotations.iter()
            .map(|rot| mesh.rotate_index(rot, i))
            .min()
            .unwrap_or(i)
            .min(i);
        map.push(rep);
    }
    IrSet { map }
}

/// Reduce an arbitrary (non-mesh) k-point list under a rotation set.
///
/// `map[i]` is the lowest index of a point equivalent to `i` modulo the
/// reciprocal lattice.  O(n^2) in the worst case; meant for explicit path
/// or band k-point lists, not for dense grids.
pub fn ir_kpoints(
    kpoints: &[V3],
    rotations: &[M33<i32>],
    time_reversal: bool,
    tol: f64,
) -> IrSet {
    let mut rots: Vec<M33<i32>> = vec![];
    for &rot in rotations {
        for &candidate in &[rot, -rot] {
            if !time_reversal && candidate != rot {
                continue;
            }
            if !rots.contains(&candidate) {
                rots.push(candidate);
            }
        }
    }

    let mut map: Vec<usize> = Vec::with_capacity(kpoints.len());
    for i in 0..kpoints.len() {
        let equivalent = (0..i).find(|&j| {
            rots.iter().any(|rot| {
                let rotated = rotate_frac(rot, &kpoints[i]);
                (0..3).all(|k| {
                    let d = rotated[k] - kpoints[j][k];
                    (d - d.round()).abs() <= tol
                })
            })
        });
        match equivalent {
            // inherit the representative so the map stays idempotent
            Some(j) => map.push(map[j]),
            None => map.push(i),
        }
    }
    IrSet { map }
}

// all 48 signed permutation matrices: the full cubic point group
#[cfg(test)]
pub(crate) fn cubic_rotations() -> Vec<M33<i32>> {
    use spgr_array_types::mat;
    let mut out = vec![];
    let perms = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for p in &perms {
        for signs in 0..8 {
            let mut m = mat::from_array([[0; 3]; 3]);
            for k in 0..3 {
                m[k][p[k]] = if signs & (1 << k) == 0 { 1 } else { -1 };
            }
            out.push(m);
        }
    }
    out
}
