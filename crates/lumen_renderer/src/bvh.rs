//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to each other and to the owned
//! primitive list by index. The tree is immutable once built, so it can be
//! shared by every render worker without locking.

use crate::{HitRecord, Hittable};
use lumen_core::SceneError;
use lumen_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug, Clone, Copy)]
enum BvhNode {
    /// Internal node, children are arena indices.
    Branch { left: usize, right: usize, bbox: Aabb },
    /// One or two primitives. A lone primitive is stored in both slots.
    Leaf { first: usize, second: usize, bbox: Aabb },
}

impl BvhNode {
    #[inline]
    fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// A BVH over an owned list of primitives.
pub struct Bvh {
    objects: Vec<Box<dyn Hittable>>,
    nodes: Vec<BvhNode>,
    root: usize,
}

impl Bvh {
    /// Build a BVH over `objects`, bounding them over the `time` span.
    ///
    /// Splits on axis `depth mod 3`, after a stable sort by each object's
    /// minimum box coordinate on that axis.
    pub fn new(objects: Vec<Box<dyn Hittable>>, time: Interval) -> Result<Self, SceneError> {
        if objects.is_empty() {
            return Err(SceneError::EmptyBvh);
        }

        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box(time)).collect();
        let mut order: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(2 * objects.len());
        let root = Self::build(&mut nodes, &boxes, &mut order, 0);

        log::debug!(
            "Built BVH: {} primitives, {} nodes",
            objects.len(),
            nodes.len()
        );

        Ok(Self {
            objects,
            nodes,
            root,
        })
    }

    /// Recursive construction; returns the arena index of the new node.
    fn build(nodes: &mut Vec<BvhNode>, boxes: &[Aabb], order: &mut [usize], depth: usize) -> usize {
        let node = match *order {
            [only] => BvhNode::Leaf {
                first: only,
                second: only,
                bbox: boxes[only],
            },
            [first, second] => BvhNode::Leaf {
                first,
                second,
                bbox: Aabb::surrounding(&boxes[first], &boxes[second]),
            },
            _ => {
                let axis = depth % 3;
                // `sort_by` is stable: equal keys keep their input order
                order.sort_by(|&a, &b| {
                    let a_min = boxes[a].axis_interval(axis).min;
                    let b_min = boxes[b].axis_interval(axis).min;
                    a_min.total_cmp(&b_min)
                });

                let mid = order.len() / 2;
                let (lower, upper) = order.split_at_mut(mid);
                let left = Self::build(nodes, boxes, lower, depth + 1);
                let right = Self::build(nodes, boxes, upper, depth + 1);
                let bbox = Aabb::surrounding(nodes[left].bbox(), nodes[right].bbox());
                BvhNode::Branch { left, right, bbox }
            }
        };

        nodes.push(node);
        nodes.len() - 1
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn hit_node(
        &self,
        index: usize,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'_>> {
        let node = &self.nodes[index];
        if !node.bbox().hit(ray, ray_t) {
            return None;
        }

        match *node {
            BvhNode::Leaf { first, second, .. } => {
                let hit_first = self.objects[first].hit(ray, ray_t, rng);
                if first == second {
                    return hit_first;
                }
                let max = hit_first.as_ref().map_or(ray_t.max, |rec| rec.t());
                self.objects[second]
                    .hit(ray, Interval::new(ray_t.min, max), rng)
                    .or(hit_first)
            }
            BvhNode::Branch { left, right, .. } => {
                let hit_left = self.hit_node(left, ray, ray_t, rng);

                // Only check right up to closest hit
                let max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t());
                self.hit_node(right, ray, Interval::new(ray_t.min, max), rng)
                    .or(hit_left)
            }
        }
    }
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        self.hit_node(self.root, ray, ray_t, rng)
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        *self.nodes[self.root].bbox()
    }
}
