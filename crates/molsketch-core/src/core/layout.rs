//! Graph-based layout normalization ("clean structure").
//!
//! Rebuilds 2D coordinates so that every bond has exactly the target length and bond angles
//! follow the usual skeletal-formula conventions. Ring systems are drawn as edge-sharing
//! regular polygons; acyclic parts hang off them in a zig-zag. The molecule itself is never
//! modified; the caller receives a complete position map and decides how (and whether) to
//! commit it.

use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::{
    angle_of, apothem, bounding_box_center, centroid, circumradius, normalize_angle,
    regular_polygon, rotate, unit_at,
};
use nalgebra::{Point2, Vector2};
use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use tracing::{debug, instrument};

/// Offset from the straight continuation used for a single chain successor.
const ZIGZAG_OFFSET: f64 = PI / 6.0;
/// Arc over which several successors of a chain atom are fanned out.
const BRANCH_ARC: f64 = 4.0 * PI / 3.0;
const EPSILON: f64 = 1e-9;

/// Computes normalized positions for every atom of `molecule`.
///
/// Each bonded component is traversed breadth-first from its highest-degree atom (first
/// encountered wins ties), which keeps its current position. When the traversal reaches a
/// ring atom, the whole ring system is placed at once, pointing away from the bond it was
/// reached through. Atoms without bonds keep their position. Finally the placed atoms are
/// translated so that their bounding-box centre coincides with the bounding-box centre of
/// their original positions.
#[instrument(skip_all, fields(atoms = molecule.atom_count()))]
pub fn normalize_layout(
    molecule: &Molecule,
    target_bond_length: f64,
) -> HashMap<AtomId, Point2<f64>> {
    let original = molecule.positions();
    let atom_order = molecule.atom_ids();

    let mut adjacency: HashMap<AtomId, Vec<AtomId>> = HashMap::new();
    for (_, bond) in molecule.bonds_iter() {
        adjacency.entry(bond.atom1_id).or_default().push(bond.atom2_id);
        adjacency.entry(bond.atom2_id).or_default().push(bond.atom1_id);
    }
    let degree = |id: &AtomId| adjacency.get(id).map_or(0, Vec::len);

    let rings = find_rings(molecule, &adjacency);
    let systems = ring_systems(&rings);
    let mut system_of: HashMap<AtomId, usize> = HashMap::new();
    for (index, members) in systems.iter().enumerate() {
        for &ring in members {
            for &atom in &rings[ring] {
                system_of.insert(atom, index);
            }
        }
    }
    let mut systems_placed: HashSet<usize> = HashSet::new();

    let mut placed: HashMap<AtomId, Point2<f64>> = HashMap::new();
    let mut depth: HashMap<AtomId, usize> = HashMap::new();
    let mut queue: VecDeque<AtomId> = VecDeque::new();
    let mut components = 0;

    // Places `atom` and, if it opens a ring system, every other atom of that system.
    let mut place = |atom: AtomId,
                     position: Point2<f64>,
                     away: Option<Vector2<f64>>,
                     level: usize,
                     placed: &mut HashMap<AtomId, Point2<f64>>,
                     depth: &mut HashMap<AtomId, usize>,
                     queue: &mut VecDeque<AtomId>| {
        placed.insert(atom, position);
        depth.insert(atom, level);
        queue.push_back(atom);

        let Some(&system) = system_of.get(&atom) else {
            return;
        };
        if !systems_placed.insert(system) {
            return;
        }
        let mut members: Vec<&[AtomId]> =
            systems[system].iter().map(|&r| rings[r].as_slice()).collect();
        if let Some(first) = members.iter().position(|ring| ring.contains(&atom)) {
            let ring = members.remove(first);
            members.insert(0, ring);
        }
        let attached = attach_ring_system(atom, position, away, &members, target_bond_length);
        for (member, point) in attached {
            if !placed.contains_key(&member) {
                placed.insert(member, point);
                depth.insert(member, level + 1);
                queue.push_back(member);
            }
        }
    };

    loop {
        let mut root: Option<AtomId> = None;
        for &id in &atom_order {
            if placed.contains_key(&id) || degree(&id) == 0 {
                continue;
            }
            if root.is_none_or(|best| degree(&id) > degree(&best)) {
                root = Some(id);
            }
        }
        let Some(root) = root else {
            break;
        };

        components += 1;
        place(root, original[&root], None, 0, &mut placed, &mut depth, &mut queue);

        while let Some(current) = queue.pop_front() {
            let origin = placed[&current];
            let neighbors = &adjacency[&current];

            let placed_angles: Vec<f64> = neighbors
                .iter()
                .filter_map(|n| placed.get(n))
                .map(|p| angle_of(&(p - origin)))
                .collect();
            let unplaced: Vec<AtomId> = neighbors
                .iter()
                .copied()
                .filter(|n| !placed.contains_key(n))
                .collect();
            if unplaced.is_empty() {
                continue;
            }

            let level = depth.get(&current).copied().unwrap_or(0);
            let angles = successor_angles(&placed_angles, unplaced.len(), level);
            for (neighbor, angle) in unplaced.into_iter().zip(angles) {
                if placed.contains_key(&neighbor) {
                    continue;
                }
                let direction = unit_at(angle);
                let position = origin + direction * target_bond_length;
                place(
                    neighbor,
                    position,
                    Some(direction),
                    level + 1,
                    &mut placed,
                    &mut depth,
                    &mut queue,
                );
            }
        }
    }

    let desired = bounding_box_center(placed.keys().map(|id| &original[id]));
    let current = bounding_box_center(placed.values());
    if let (Some(desired), Some(current)) = (desired, current) {
        let shift = desired - current;
        for position in placed.values_mut() {
            *position += shift;
        }
    }

    debug!(
        "Normalized {} atom(s) in {} component(s), {} ring(s) in {} ring system(s)",
        placed.len(),
        components,
        rings.len(),
        systems.len()
    );

    let mut result = original;
    result.extend(placed);
    result
}

/// Directions (radians) for `count` successors of an atom whose already-placed neighbors lie
/// at `placed_angles`.
fn successor_angles(placed_angles: &[f64], count: usize, level: usize) -> Vec<f64> {
    match placed_angles {
        [] => (0..count)
            .map(|i| -FRAC_PI_2 + TAU * i as f64 / count as f64)
            .collect(),
        [incoming] => {
            let away = incoming + PI;
            if count == 1 {
                let sign = if level % 2 == 0 { 1.0 } else { -1.0 };
                vec![away + sign * ZIGZAG_OFFSET]
            } else {
                let start = away - BRANCH_ARC / 2.0;
                (0..count)
                    .map(|i| start + BRANCH_ARC * (i as f64 + 0.5) / count as f64)
                    .collect()
            }
        }
        _ => {
            let (gap_start, gap) = largest_gap(placed_angles);
            (0..count)
                .map(|i| gap_start + gap * (i + 1) as f64 / (count + 1) as f64)
                .collect()
        }
    }
}

/// Finds the widest empty sector between the given directions, wrap-around included.
fn largest_gap(angles: &[f64]) -> (f64, f64) {
    let mut sorted: Vec<f64> = angles.iter().map(|&a| normalize_angle(a)).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best = (sorted[sorted.len() - 1], sorted[0] + TAU - sorted[sorted.len() - 1]);
    for pair in sorted.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > best.1 {
            best = (pair[0], gap);
        }
    }
    best
}

/// The smallest ring through every cyclic bond, deduplicated, in bond order.
///
/// Each ring is a closed path: consecutive atoms are bonded and so are the last and first.
fn find_rings(molecule: &Molecule, adjacency: &HashMap<AtomId, Vec<AtomId>>) -> Vec<Vec<AtomId>> {
    let mut rings = Vec::new();
    let mut seen: HashSet<Vec<AtomId>> = HashSet::new();
    for (_, bond) in molecule.bonds_iter() {
        let Some(path) = path_avoiding_bond(adjacency, bond.atom1_id, bond.atom2_id) else {
            continue;
        };
        let mut key = path.clone();
        key.sort_unstable();
        if seen.insert(key) {
            rings.push(path);
        }
    }
    rings
}

/// Shortest path from `from` to `to` that does not use the direct bond between them.
fn path_avoiding_bond(
    adjacency: &HashMap<AtomId, Vec<AtomId>>,
    from: AtomId,
    to: AtomId,
) -> Option<Vec<AtomId>> {
    let mut parent: HashMap<AtomId, AtomId> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    let mut visited = HashSet::from([from]);

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(&current).into_iter().flatten() {
            if current == from && next == to {
                continue;
            }
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(&previous) = parent.get(&cursor) {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Groups rings that share at least one atom. Returns ring indices per system.
fn ring_systems(rings: &[Vec<AtomId>]) -> Vec<Vec<usize>> {
    let mut systems: Vec<(HashSet<AtomId>, Vec<usize>)> = Vec::new();
    for (index, ring) in rings.iter().enumerate() {
        let mut atoms: HashSet<AtomId> = ring.iter().copied().collect();
        let mut members = vec![index];
        let touching: Vec<usize> = systems
            .iter()
            .enumerate()
            .filter(|(_, (existing, _))| ring.iter().any(|a| existing.contains(a)))
            .map(|(i, _)| i)
            .collect();
        for &i in touching.iter().rev() {
            let (existing, rings_in) = systems.remove(i);
            atoms.extend(existing);
            members.extend(rings_in);
        }
        members.sort_unstable();
        systems.push((atoms, members));
    }
    systems.into_iter().map(|(_, members)| members).collect()
}

/// Lays out a ring system so that `anchor` sits at `position` and the system extends along
/// `away` (unrotated when `None`). The first ring must contain `anchor`.
fn attach_ring_system(
    anchor: AtomId,
    position: Point2<f64>,
    away: Option<Vector2<f64>>,
    rings: &[&[AtomId]],
    bond_length: f64,
) -> Vec<(AtomId, Point2<f64>)> {
    let local = ring_system_coordinates(rings, bond_length);
    let lookup: HashMap<AtomId, Point2<f64>> = local.iter().copied().collect();
    let Some(pivot) = lookup.get(&anchor).copied() else {
        return Vec::new();
    };

    let inward = centroid(lookup.values()).map_or_else(Vector2::<f64>::zeros, |c| c - pivot);
    let angle = match away {
        Some(direction) if inward.norm() > EPSILON && direction.norm() > EPSILON => {
            angle_of(&direction) - angle_of(&inward)
        }
        _ => 0.0,
    };

    local
        .into_iter()
        .map(|(atom, point)| (atom, position + rotate(&(point - pivot), angle)))
        .collect()
}

/// Local coordinates for a ring system, in placement order.
///
/// The first ring becomes a regular polygon around the origin. Each further ring is built
/// as a regular polygon on a bond it shares with the rings already drawn (fusion) or, failing
/// that, outward from a single shared atom (spiro).
fn ring_system_coordinates(rings: &[&[AtomId]], bond_length: f64) -> Vec<(AtomId, Point2<f64>)> {
    let mut order: Vec<(AtomId, Point2<f64>)> = Vec::new();
    let mut local: HashMap<AtomId, Point2<f64>> = HashMap::new();
    let Some((first, rest)) = rings.split_first() else {
        return order;
    };

    let polygon = regular_polygon(&Point2::origin(), first.len(), bond_length, -FRAC_PI_2, true);
    for (&atom, point) in first.iter().zip(polygon) {
        if local.insert(atom, point).is_none() {
            order.push((atom, point));
        }
    }

    let mut pending: Vec<&[AtomId]> = rest.to_vec();
    loop {
        pending.retain(|ring| ring.iter().any(|atom| !local.contains_key(atom)));
        let next = pending
            .iter()
            .position(|ring| shared_bond(ring, &local).is_some())
            .or_else(|| {
                pending
                    .iter()
                    .position(|ring| ring.iter().any(|atom| local.contains_key(atom)))
            });
        let Some(index) = next else {
            break;
        };
        let ring = pending.remove(index);
        for (atom, point) in attached_polygon(ring, &local, bond_length) {
            if !local.contains_key(&atom) {
                local.insert(atom, point);
                order.push((atom, point));
            }
        }
    }
    order
}

/// Index `i` such that `ring[i]` and its successor are both already placed.
fn shared_bond(ring: &[AtomId], local: &HashMap<AtomId, Point2<f64>>) -> Option<usize> {
    let n = ring.len();
    (0..n).find(|&i| local.contains_key(&ring[i]) && local.contains_key(&ring[(i + 1) % n]))
}

/// Regular polygon for `ring` attached to the atoms already in `local`, on the side facing
/// away from them.
fn attached_polygon(
    ring: &[AtomId],
    local: &HashMap<AtomId, Point2<f64>>,
    bond_length: f64,
) -> Vec<(AtomId, Point2<f64>)> {
    let n = ring.len();
    let Some(inner) = centroid(local.values()) else {
        return Vec::new();
    };

    let (start, center, clockwise) = if let Some(i) = shared_bond(ring, local) {
        let a = local[&ring[i]];
        let b = local[&ring[(i + 1) % n]];
        let edge = b - a;
        let normal = Vector2::new(-edge.y, edge.x) / edge.norm();
        let offset = normal * apothem(n, bond_length);
        let mid = nalgebra::center(&a, &b);
        let center = if (mid + offset - inner).norm() >= (mid - offset - inner).norm() {
            mid + offset
        } else {
            mid - offset
        };
        let sweep = signed_turn(angle_of(&(b - center)) - angle_of(&(a - center)));
        (i, center, sweep > 0.0)
    } else {
        let Some(i) = ring.iter().position(|atom| local.contains_key(atom)) else {
            return Vec::new();
        };
        let a = local[&ring[i]];
        let outward = a - inner;
        let direction = if outward.norm() > EPSILON {
            outward / outward.norm()
        } else {
            -Vector2::y()
        };
        (i, a + direction * circumradius(n, bond_length), true)
    };

    let first = local[&ring[start]];
    let vertices = regular_polygon(
        &center,
        n,
        bond_length,
        angle_of(&(first - center)),
        clockwise,
    );
    vertices
        .into_iter()
        .enumerate()
        .map(|(k, point)| (ring[(start + k) % n], point))
        .collect()
}

/// Wraps an angle difference into `(-PI, PI]`.
fn signed_turn(angle: f64) -> f64 {
    let wrapped = normalize_angle(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}
