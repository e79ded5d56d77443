//! Read-only traversal of the parent/child links.

use smallvec::SmallVec;

use crate::entity::GameObjectId;
use crate::scene::Scene;

/// Direct children, most recently attached first.
pub struct Children<'a> {
    scene: &'a Scene,
    next: Option<GameObjectId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = GameObjectId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.scene.object(current).and_then(|o| o.next_sibling());
        Some(current)
    }
}

/// Every object below a root, depth-first, in child-list order.
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: SmallVec<[GameObjectId; 16]>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = GameObjectId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let object = self.scene.object(current)?;
        if let Some(sibling) = object.next_sibling() {
            self.stack.push(sibling);
        }
        if let Some(child) = object.first_child() {
            self.stack.push(child);
        }
        Some(current)
    }
}

/// Parent chain from the immediate parent up to the root.
pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<GameObjectId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = GameObjectId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.scene.object(current).and_then(|o| o.parent());
        Some(current)
    }
}

impl Scene {
    /// Empty for unknown handles.
    pub fn children(&self, id: GameObjectId) -> Children<'_> {
        Children {
            scene: self,
            next: self.object(id).and_then(|o| o.first_child()),
        }
    }

    /// All descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: GameObjectId) -> Descendants<'_> {
        let mut stack = SmallVec::new();
        if let Some(child) = self.object(id).and_then(|o| o.first_child()) {
            stack.push(child);
        }
        Descendants { scene: self, stack }
    }

    pub fn ancestors(&self, id: GameObjectId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.object(id).and_then(|o| o.parent()),
        }
    }

    /// Number of ancestors. Roots have depth 0.
    pub fn depth(&self, id: GameObjectId) -> usize {
        self.ancestors(id).count()
    }

    pub fn child_count(&self, id: GameObjectId) -> usize {
        self.children(id).count()
    }
}
