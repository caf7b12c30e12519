// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Oriented contact records

use crate::ecs::{ComponentRef, EntityId};
use crate::math::{RectF, Vec2};

/// One overlapping collider pair in one frame
///
/// Handlers always receive the contact from their own entity's side: `mine`
/// is the collider on the handler's entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// The collider on the receiving entity
    pub mine: ComponentRef,
    /// The collider on the other entity
    pub other: ComponentRef,
    /// World-space overlap rectangle
    pub overlap: RectF,
    /// Unit normal of the edge of `other` that `mine` has run into
    pub normal: Vec2,
}

impl ContactInfo {
    /// Build a contact between two overlapping world rectangles
    ///
    /// The separating axis is the one with the smaller overlap extent. A
    /// square overlap yields a vertical normal, i.e. a horizontal edge. The
    /// normal points from the overlap center back toward `mine`'s center.
    pub fn between(mine: ComponentRef, mine_rect: &RectF, other: ComponentRef, overlap: RectF) -> Self {
        let normal = if overlap.width() < overlap.height() {
            if mine_rect.center().x < overlap.center().x {
                Vec2::new(-1.0, 0.0)
            } else {
                Vec2::new(1.0, 0.0)
            }
        } else if mine_rect.center().y < overlap.center().y {
            Vec2::new(0.0, -1.0)
        } else {
            Vec2::new(0.0, 1.0)
        };

        ContactInfo {
            mine,
            other,
            overlap,
            normal,
        }
    }

    /// The same contact seen from `other`'s side
    pub fn inverted(&self) -> Self {
        ContactInfo {
            mine: self.other,
            other: self.mine,
            overlap: self.overlap,
            normal: -self.normal,
        }
    }

    /// Entity owning `mine`
    pub fn mine_entity(&self) -> EntityId {
        self.mine.entity
    }

    /// Entity owning `other`
    pub fn other_entity(&self) -> EntityId {
        self.other.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{ComponentId, ComponentKey};
    use crate::physics::Collider;

    fn collider_ref(entity: u64) -> ComponentRef {
        ComponentRef {
            entity: EntityId::new(entity),
            key: ComponentKey::of::<Collider>(),
            id: ComponentId::new(entity),
        }
    }

    #[test]
    fn test_narrow_overlap_uses_x_axis() {
        let left = RectF::new(0.0, 0.0, 10.0, 10.0);
        let right = RectF::new(8.0, 0.0, 10.0, 10.0);
        let overlap = left.overlap(&right).unwrap();

        let contact = ContactInfo::between(collider_ref(1), &left, collider_ref(2), overlap);
        assert_eq!(contact.normal, Vec2::new(-1.0, 0.0));

        let from_right = ContactInfo::between(collider_ref(2), &right, collider_ref(1), overlap);
        assert_eq!(from_right.normal, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_square_overlap_uses_y_axis() {
        let top = RectF::new(0.0, 0.0, 4.0, 4.0);
        let bottom = RectF::new(2.0, 2.0, 4.0, 4.0);
        let overlap = top.overlap(&bottom).unwrap();
        assert_eq!(overlap.width(), overlap.height());

        let contact = ContactInfo::between(collider_ref(1), &top, collider_ref(2), overlap);
        assert_eq!(contact.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_inverted() {
        let rect = RectF::new(0.0, 0.0, 10.0, 10.0);
        let overlap = RectF::new(8.0, 0.0, 2.0, 10.0);
        let contact = ContactInfo::between(collider_ref(1), &rect, collider_ref(2), overlap);
        let inverted = contact.inverted();

        assert_eq!(inverted.mine, contact.other);
        assert_eq!(inverted.other, contact.mine);
        assert_eq!(inverted.normal, -contact.normal);
        assert_eq!(inverted.mine_entity(), EntityId::new(2));
        assert_eq!(inverted.inverted(), contact);
    }
}
