// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used as the broad phase for polygon-vs-polygon bounds tests and for
//! finding scene meshes overlapping a brush.

use super::BoundingBox;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Items with their own bounds (only for leaf nodes)
    pub items: Vec<(usize, BoundingBox)>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, items: Vec<(usize, BoundingBox)>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            items,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            items: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over arbitrary items identified by index
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
    len: usize,
}

impl BVH {
    /// Build BVH from `(item_index, bbox)` pairs
    pub fn build(items: Vec<(usize, BoundingBox)>) -> Self {
        let len = items.len();
        if items.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
                len,
            };
        }

        let root = Self::build_recursive(items, 0);
        Self { root, len }
    }

    fn build_recursive(mut items: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 32;
        const MIN_ITEMS: usize = 4;

        if items.len() <= MIN_ITEMS || depth >= MAX_DEPTH {
            let bbox = Self::compute_union_bbox(&items);
            return BVHNode::leaf(bbox, items);
        }

        let split_axis = Self::find_best_split_axis(&items);

        items.sort_by(|(_, bbox_a), (_, bbox_b)| {
            let center_a = bbox_a.center();
            let center_b = bbox_b.center();
            center_a[split_axis].total_cmp(&center_b[split_axis])
        });

        // Split at median
        let right_items = items.split_off(items.len() / 2);

        let left = Box::new(Self::build_recursive(items, depth + 1));
        let right = Box::new(Self::build_recursive(right_items, depth + 1));

        let bbox = left.bbox.union(&right.bbox);

        BVHNode::internal(bbox, left, right)
    }

    /// Longest axis of the items' combined bounds
    fn find_best_split_axis(items: &[(usize, BoundingBox)]) -> usize {
        let size = Self::compute_union_bbox(items).size();

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    fn compute_union_bbox(items: &[(usize, BoundingBox)]) -> BoundingBox {
        items
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Query items whose bounds intersect the given bounding box.
    /// Results are returned in ascending index order.
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result.sort_unstable();
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            // A leaf box can overlap the query while its items do not
            result.extend(
                node.items
                    .iter()
                    .filter(|(_, item_bbox)| item_bbox.intersects(bbox))
                    .map(|(idx, _)| *idx),
            );
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    /// Get root node (for testing)
    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
