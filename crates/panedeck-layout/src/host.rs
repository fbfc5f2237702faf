#![forbid(unsafe_code)]

//! Host seam: the retained element tree the engine arranges but does not own.
//!
//! The engine never touches a browser DOM directly. Everything it needs to
//! know about host content goes through [`ContentHost`]: identity and region
//! membership of an element, key lookups in document order, emptiness checks
//! for demotion, shallow clones for copy-drags, and a journal of structural
//! mutations that drives pending-tab reconciliation.
//!
//! [`MemoryHost`] is a small in-memory implementation used by tests and as a
//! reference adapter.

use std::collections::BTreeMap;

use crate::model::SearchKey;

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementRef(u64);

impl ElementRef {
    /// Wrap a host-specific raw handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of one element as the engine sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub dom_id: Option<String>,
    pub classes: Vec<String>,
    /// Named regions containing the element (its own and its ancestors').
    pub regions: Vec<String>,
}

impl ElementInfo {
    #[must_use]
    pub fn matches(&self, key: &SearchKey) -> bool {
        match key {
            SearchKey::DomId(id) => self.dom_id.as_deref() == Some(id.as_str()),
            SearchKey::Class(class) => self.classes.iter().any(|c| c == class),
        }
    }

    #[must_use]
    pub fn in_any_region(&self, names: &[String]) -> bool {
        self.regions.iter().any(|region| names.contains(region))
    }

    /// Preferred stable identifier: DOM id first, then first class.
    #[must_use]
    pub fn search_key(&self) -> Option<SearchKey> {
        if let Some(id) = self.dom_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(SearchKey::DomId(id.to_string()));
        }
        self.classes
            .first()
            .map(|class| SearchKey::Class(class.clone()))
    }
}

/// Structural change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMutation {
    /// An element (and its subtree) was inserted.
    Added(ElementRef),
    /// All children of an element were removed.
    Emptied(ElementRef),
}

/// Access to host content.
pub trait ContentHost {
    /// Identity of `el`, or `None` if it no longer exists.
    fn info(&self, el: ElementRef) -> Option<ElementInfo>;

    /// Parent of `el`.
    fn parent(&self, el: ElementRef) -> Option<ElementRef>;

    /// Every element matching `key`, in document traversal order.
    fn find_all(&self, key: &SearchKey) -> Vec<ElementRef>;

    /// First match for `key` at or below `root`.
    fn find_within(&self, root: ElementRef, key: &SearchKey) -> Option<ElementRef>;

    /// Whether `el` has no children.
    fn is_empty(&self, el: ElementRef) -> bool;

    /// Copy `el` without its subtree under a fresh identity.
    fn shallow_clone(&mut self, el: ElementRef) -> Option<ElementRef>;

    /// Drain the structural mutations observed since the last call.
    fn drain_mutations(&mut self) -> Vec<HostMutation> {
        Vec::new()
    }

    /// First match for `key` in document order.
    fn find(&self, key: &SearchKey) -> Option<ElementRef> {
        self.find_all(key).into_iter().next()
    }

    /// Whether `el` is `ancestor` or lies below it.
    fn is_within(&self, el: ElementRef, ancestor: ElementRef) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

#[derive(Debug, Clone, Default)]
struct ElementRecord {
    dom_id: Option<String>,
    classes: Vec<String>,
    region: Option<String>,
    parent: Option<ElementRef>,
    children: Vec<ElementRef>,
}

/// In-memory retained element tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    elements: BTreeMap<ElementRef, ElementRecord>,
    roots: Vec<ElementRef>,
    next: u64,
    journal: Vec<HostMutation>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new element under `parent` (or as a document root).
    pub fn add_element(
        &mut self,
        parent: Option<ElementRef>,
        dom_id: Option<&str>,
        classes: &[&str],
    ) -> ElementRef {
        self.next += 1;
        let el = ElementRef(self.next);
        self.elements.insert(
            el,
            ElementRecord {
                dom_id: dom_id.map(str::to_string),
                classes: classes.iter().map(|c| (*c).to_string()).collect(),
                ..ElementRecord::default()
            },
        );
        self.attach(el, parent);
        self.journal.push(HostMutation::Added(el));
        el
    }

    /// Move `child` (with its subtree) under `parent`.
    pub fn append_child(&mut self, parent: ElementRef, child: ElementRef) {
        if !self.elements.contains_key(&parent) || !self.elements.contains_key(&child) {
            return;
        }
        self.detach(child);
        self.attach(child, Some(parent));
        self.journal.push(HostMutation::Added(child));
    }

    /// Remove every descendant of `el`.
    pub fn clear_children(&mut self, el: ElementRef) {
        let Some(children) = self.elements.get_mut(&el).map(|r| std::mem::take(&mut r.children))
        else {
            return;
        };
        for child in children {
            self.remove_subtree(child);
        }
        self.journal.push(HostMutation::Emptied(el));
    }

    /// Remove `el` and its subtree.
    pub fn remove(&mut self, el: ElementRef) {
        self.detach(el);
        self.remove_subtree(el);
    }

    /// Mark `el` as the root of a named region.
    pub fn set_region(&mut self, el: ElementRef, name: &str) {
        if let Some(record) = self.elements.get_mut(&el) {
            record.region = Some(name.to_string());
        }
    }

    #[must_use]
    pub fn contains(&self, el: ElementRef) -> bool {
        self.elements.contains_key(&el)
    }

    #[must_use]
    pub fn children(&self, el: ElementRef) -> &[ElementRef] {
        self.elements
            .get(&el)
            .map_or(&[], |record| record.children.as_slice())
    }

    fn attach(&mut self, el: ElementRef, parent: Option<ElementRef>) {
        match parent.filter(|p| self.elements.contains_key(p)) {
            Some(parent) => {
                if let Some(record) = self.elements.get_mut(&parent) {
                    record.children.push(el);
                }
                if let Some(record) = self.elements.get_mut(&el) {
                    record.parent = Some(parent);
                }
            }
            None => self.roots.push(el),
        }
    }

    fn detach(&mut self, el: ElementRef) {
        let parent = self.elements.get_mut(&el).and_then(|r| r.parent.take());
        match parent {
            Some(parent) => {
                if let Some(record) = self.elements.get_mut(&parent) {
                    record.children.retain(|c| *c != el);
                }
            }
            None => self.roots.retain(|r| *r != el),
        }
    }

    fn remove_subtree(&mut self, el: ElementRef) {
        let mut stack = vec![el];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.elements.remove(&current) {
                stack.extend(record.children);
            }
        }
    }

    fn walk(&self, root: ElementRef, out: &mut Vec<ElementRef>) {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(record) = self.elements.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(record.children.iter().rev().copied());
        }
    }

    fn document_order(&self) -> Vec<ElementRef> {
        let mut out = Vec::with_capacity(self.elements.len());
        for root in &self.roots {
            self.walk(*root, &mut out);
        }
        out
    }
}

impl ContentHost for MemoryHost {
    fn info(&self, el: ElementRef) -> Option<ElementInfo> {
        let record = self.elements.get(&el)?;
        let mut regions = Vec::new();
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            let Some(node) = self.elements.get(&current) else {
                break;
            };
            if let Some(region) = &node.region {
                regions.push(region.clone());
            }
            cursor = node.parent;
        }
        Some(ElementInfo {
            dom_id: record.dom_id.clone(),
            classes: record.classes.clone(),
            regions,
        })
    }

    fn parent(&self, el: ElementRef) -> Option<ElementRef> {
        self.elements.get(&el).and_then(|record| record.parent)
    }

    fn find_all(&self, key: &SearchKey) -> Vec<ElementRef> {
        self.document_order()
            .into_iter()
            .filter(|el| self.info(*el).is_some_and(|info| info.matches(key)))
            .collect()
    }

    fn find_within(&self, root: ElementRef, key: &SearchKey) -> Option<ElementRef> {
        let mut order = Vec::new();
        self.walk(root, &mut order);
        order
            .into_iter()
            .find(|el| self.info(*el).is_some_and(|info| info.matches(key)))
    }

    fn is_empty(&self, el: ElementRef) -> bool {
        self.elements
            .get(&el)
            .is_none_or(|record| record.children.is_empty())
    }

    fn shallow_clone(&mut self, el: ElementRef) -> Option<ElementRef> {
        let record = self.elements.get(&el)?;
        let classes: Vec<String> = record.classes.clone();
        let parent = record.parent;
        self.next += 1;
        let copy = ElementRef(self.next);
        self.elements.insert(
            copy,
            ElementRecord {
                dom_id: None,
                classes,
                ..ElementRecord::default()
            },
        );
        self.attach(copy, parent);
        Some(copy)
    }

    fn drain_mutations(&mut self) -> Vec<HostMutation> {
        std::mem::take(&mut self.journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_follows_document_order() {
        let mut host = MemoryHost::new();
        let body = host.add_element(None, Some("body"), &[]);
        let first = host.add_element(Some(body), None, &["widget"]);
        let nested = host.add_element(Some(first), None, &["widget"]);
        let second = host.add_element(Some(body), None, &["widget"]);
        let key = SearchKey::Class("widget".into());
        assert_eq!(host.find_all(&key), vec![first, nested, second]);
        assert_eq!(host.find(&key), Some(first));
        assert_eq!(host.find_within(second, &key), Some(second));
        assert!(host.is_within(nested, body));
        assert!(!host.is_within(second, first));
    }

    #[test]
    fn regions_are_inherited() {
        let mut host = MemoryHost::new();
        let chat = host.add_element(None, None, &[]);
        host.set_region(chat, "chat");
        let message = host.add_element(Some(chat), Some("m1"), &[]);
        let info = host.info(message).expect("element exists");
        assert!(info.in_any_region(&["chat".to_string()]));
        assert_eq!(info.search_key(), Some(SearchKey::DomId("m1".into())));
    }

    #[test]
    fn clear_children_reports_emptied() {
        let mut host = MemoryHost::new();
        let panel = host.add_element(None, None, &[]);
        let child = host.add_element(Some(panel), None, &[]);
        host.drain_mutations();
        assert!(!host.is_empty(panel));
        host.clear_children(panel);
        assert!(host.is_empty(panel));
        assert!(!host.contains(child));
        assert_eq!(host.drain_mutations(), vec![HostMutation::Emptied(panel)]);
    }

    #[test]
    fn shallow_clone_drops_identity_and_children() {
        let mut host = MemoryHost::new();
        let el = host.add_element(None, Some("x"), &["card"]);
        host.add_element(Some(el), None, &[]);
        let copy = host.shallow_clone(el).expect("clone");
        let info = host.info(copy).expect("clone exists");
        assert_eq!(info.dom_id, None);
        assert_eq!(info.classes, vec!["card".to_string()]);
        assert!(host.is_empty(copy));
    }
}
