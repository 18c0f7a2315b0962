use crate::core::models::system::MolecularSystem;
use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use std::f64::consts::PI;

// Distance (Angstroms) below which a point is considered to lie on a line.
const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// A proper rigid motion: rotation about the origin followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }

    /// Moves every atom of `system` in place.
    pub fn apply_to_system(&self, system: &mut MolecularSystem) {
        for (_, atom) in system.atoms_iter_mut() {
            atom.position = self.apply(&atom.position);
        }
    }

    /// Returns a moved copy of `system`, leaving the input untouched.
    pub fn transformed(&self, system: &MolecularSystem) -> MolecularSystem {
        let mut moved = system.clone();
        self.apply_to_system(&mut moved);
        moved
    }
}

/// How well the point sets constrained the superposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Determinacy {
    /// Three or more non-collinear pairs; the rotation is unique.
    Full,
    /// All points of a set lie on one line; the minimal rotation carrying the
    /// `from` line onto the `to` line was chosen.
    Collinear,
    /// A single pair; only the translation is determined.
    SinglePoint,
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Computes the proper rigid transform that minimizes the summed squared
/// distance between `transform(from[i])` and `to[i]` (Kabsch).
///
/// Underdetermined inputs are resolved deterministically: a single pair gives a
/// pure translation, and collinear sets give the smallest rotation aligning the
/// two lines. Reflections are never returned.
///
/// Returns `None` if the slices are empty or differ in length.
pub fn superpose(
    from_points: &[Point3<f64>],
    to_points: &[Point3<f64>],
) -> Option<(RigidTransform, Determinacy)> {
    if from_points.len() != to_points.len() {
        return None;
    }
    let from_centroid = centroid(from_points)?;
    let to_centroid = centroid(to_points)?;

    if from_points.len() == 1 {
        let translation = to_centroid - from_centroid;
        return Some((
            RigidTransform::new(Rotation3::identity(), translation),
            Determinacy::SinglePoint,
        ));
    }

    let centered_from: Vec<_> = from_points.iter().map(|p| p - from_centroid).collect();
    let centered_to: Vec<_> = to_points.iter().map(|p| p - to_centroid).collect();

    let (rotation, determinacy) =
        if is_collinear(&centered_from) || is_collinear(&centered_to) {
            (
                minimal_line_rotation(&centered_from, &centered_to),
                Determinacy::Collinear,
            )
        } else {
            (
                kabsch_rotation(&centered_from, &centered_to)?,
                Determinacy::Full,
            )
        };

    let translation = to_centroid.coords - rotation * from_centroid.coords;
    Some((RigidTransform::new(rotation, translation), determinacy))
}

fn kabsch_rotation(
    centered_from: &[Vector3<f64>],
    centered_to: &[Vector3<f64>],
) -> Option<Rotation3<f64>> {
    let h = centered_from
        .iter()
        .zip(centered_to.iter())
        .fold(Matrix3::zeros(), |acc, (f, t)| acc + t * f.transpose());

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;

    let d = (u * v_t).determinant();
    let mut correction = Matrix3::identity();
    if d < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation_matrix = u * correction * v_t;
    Some(Rotation3::from_matrix(&rotation_matrix))
}

fn farthest_index(centered: &[Vector3<f64>]) -> Option<usize> {
    centered
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.norm_squared()
                .partial_cmp(&b.norm_squared())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

fn is_collinear(centered: &[Vector3<f64>]) -> bool {
    let Some(axis_index) = farthest_index(centered) else {
        return true;
    };
    let axis = centered[axis_index];
    if axis.norm() < COLLINEAR_TOLERANCE {
        return true;
    }
    let direction = axis.normalize();
    centered
        .iter()
        .all(|v| v.cross(&direction).norm() < COLLINEAR_TOLERANCE)
}

// Both lines are read through the same pair (the `from` point farthest from its
// centroid), so the two directions correspond.
fn minimal_line_rotation(
    centered_from: &[Vector3<f64>],
    centered_to: &[Vector3<f64>],
) -> Rotation3<f64> {
    let Some(index) = farthest_index(centered_from) else {
        return Rotation3::identity();
    };
    let from_dir = centered_from[index];
    let to_dir = centered_to[index];
    if from_dir.norm() < COLLINEAR_TOLERANCE || to_dir.norm() < COLLINEAR_TOLERANCE {
        return Rotation3::identity();
    }

    Rotation3::rotation_between(&from_dir, &to_dir).unwrap_or_else(|| {
        // Antiparallel: half turn about a fixed axis perpendicular to the line.
        let helper = if from_dir.x.abs() < 0.9 * from_dir.norm() {
            Vector3::x()
        } else {
            Vector3::y()
        };
        Rotation3::from_axis_angle(&Unit::new_normalize(from_dir.cross(&helper)), PI)
    })
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;

    fn tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.3, 0.4, 1.7),
        ]
    }

    fn assert_points_close(a: &[Point3<f64>], b: &[Point3<f64>]) {
        for (p, q) in a.iter().zip(b) {
            assert!((p - q).norm() < 1e-9, "{p:?} != {q:?}");
        }
    }

    #[test]
    fn superpose_pure_translation() {
        let from = tetrahedron();
        let shift = Vector3::new(10.0, 20.0, 30.0);
        let to: Vec<_> = from.iter().map(|p| p + shift).collect();

        let (transform, determinacy) = superpose(&from, &to).unwrap();

        assert_eq!(determinacy, Determinacy::Full);
        assert!(transform.rotation.angle().abs() < 1e-9);
        assert!((transform.translation - shift).norm() < 1e-9);
    }

    #[test]
    fn superpose_recovers_known_rotation_and_translation() {
        let from = tetrahedron();
        let truth = RigidTransform::new(
            Rotation3::from_axis_angle(&Vector3::z_axis(), 0.5)
                * Rotation3::from_axis_angle(&Vector3::x_axis(), -1.2),
            Vector3::new(-3.0, 4.0, 0.5),
        );
        let to: Vec<_> = from.iter().map(|p| truth.apply(p)).collect();

        let (transform, _) = superpose(&from, &to).unwrap();
        let moved: Vec<_> = from.iter().map(|p| transform.apply(p)).collect();

        assert_points_close(&moved, &to);
        assert!(calculate_rmsd(&moved, &to).unwrap() < 1e-9);
    }

    #[test]
    fn superpose_never_returns_a_reflection() {
        let from = tetrahedron();
        let mirrored: Vec<_> = from.iter().map(|p| Point3::new(p.x, p.y, -p.z)).collect();

        let (transform, _) = superpose(&from, &mirrored).unwrap();

        assert!((transform.rotation.matrix().determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_gives_translation_only() {
        let from = [Point3::new(1.0, 1.0, 1.0)];
        let to = [Point3::new(2.0, 3.0, 4.0)];

        let (transform, determinacy) = superpose(&from, &to).unwrap();

        assert_eq!(determinacy, Determinacy::SinglePoint);
        assert_eq!(transform.rotation, Rotation3::identity());
        assert_eq!(transform.apply(&from[0]), to[0]);
    }

    #[test]
    fn collinear_points_use_minimal_rotation() {
        let from = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let to = [
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
            Point3::new(5.0, 2.0, 0.0),
        ];

        let (transform, determinacy) = superpose(&from, &to).unwrap();
        let moved: Vec<_> = from.iter().map(|p| transform.apply(p)).collect();

        assert_eq!(determinacy, Determinacy::Collinear);
        assert_points_close(&moved, &to);
        assert!((transform.rotation.angle() - PI / 2.0).abs() < 1e-9);
        let axis = transform.rotation.axis().unwrap();
        assert!((axis.into_inner() - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn antiparallel_lines_are_resolved_deterministically() {
        let from = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let to = [Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];

        let (first, _) = superpose(&from, &to).unwrap();
        let (second, _) = superpose(&from, &to).unwrap();

        assert_eq!(first, second);
        let moved: Vec<_> = from.iter().map(|p| first.apply(p)).collect();
        assert_points_close(&moved, &to);
    }

    #[test]
    fn superpose_rejects_empty_or_mismatched_inputs() {
        assert!(superpose(&[], &[]).is_none());
        assert!(superpose(&tetrahedron(), &tetrahedron()[..3]).is_none());
    }

    #[test]
    fn transformed_leaves_original_untouched() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A', ChainType::Protein);
        let residue_id = system.add_residue(chain_id, 1, "GLY").unwrap();
        let atom_id = system
            .add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()))
            .unwrap();

        let shift = RigidTransform::new(Rotation3::identity(), Vector3::new(1.0, 0.0, 0.0));
        let moved = shift.transformed(&system);

        assert_eq!(system.atom(atom_id).unwrap().position, Point3::origin());
        assert_eq!(
            moved.atom(atom_id).unwrap().position,
            Point3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn rmsd_requires_matching_non_empty_sets() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)];
        assert!((calculate_rmsd(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!(calculate_rmsd(&a, &b[..1]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }
}
