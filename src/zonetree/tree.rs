//! The ordered name tree.
//!
//! The tree is a left-leaning red-black tree keyed by owner name in
//! canonical DNS order. Each node holds an [`Elem`] with all records of its
//! owner. Besides exact search it provides the floor and ceiling queries
//! used to find covering NSEC records.

use super::elem::Elem;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::rdata::ZoneRecordData;
use core::cmp::Ordering;

//------------ Tree ----------------------------------------------------------

/// An ordered tree of elements.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    root: Link,
    count: usize,
}

type Link = Option<Box<Node>>;

impl Tree {
    /// Creates a new, empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the element for the given name.
    pub fn search(&self, name: &Name) -> Option<&Elem> {
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            node = match name.cmp(current.elem.name()) {
                Ordering::Less => current.left.as_deref(),
                Ordering::Greater => current.right.as_deref(),
                Ordering::Equal => return Some(&current.elem),
            }
        }
        None
    }

    /// Inserts a record into the element of its owner.
    ///
    /// The element is created if necessary.
    pub fn insert(&mut self, record: Record) {
        let (mut root, added) = Node::insert(self.root.take(), record);
        root.color = Color::Black;
        self.root = Some(root);
        if added {
            self.count += 1;
        }
    }

    /// Removes all records of the record's type at the record's owner.
    ///
    /// If the element of the owner becomes empty, it is removed from the
    /// tree.
    pub fn delete(&mut self, record: &Record) {
        self.delete_type(record.owner(), record.rtype())
    }

    /// Removes all records of the given type at the given name.
    pub fn delete_type(&mut self, name: &Name, rtype: Rtype) {
        let now_empty = match self.search_mut(name) {
            Some(elem) => {
                elem.delete(rtype);
                elem.is_empty()
            }
            None => return,
        };
        if !now_empty {
            return;
        }
        self.root = self.root.take().and_then(|root| Node::delete(root, name));
        if let Some(root) = self.root.as_mut() {
            root.color = Color::Black;
        }
        self.count -= 1;
    }

    fn search_mut(&mut self, name: &Name) -> Option<&mut Elem> {
        let mut node = self.root.as_deref_mut();
        while let Some(current) = node {
            node = match name.cmp(current.elem.name()) {
                Ordering::Less => current.left.as_deref_mut(),
                Ordering::Greater => current.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut current.elem),
            }
        }
        None
    }

    /// Returns the greatest element whose name is less or equal to `name`.
    pub fn prev(&self, name: &Name) -> Option<&Elem> {
        let mut node = self.root.as_deref();
        let mut res = None;
        while let Some(current) = node {
            node = match name.cmp(current.elem.name()) {
                Ordering::Less => current.left.as_deref(),
                Ordering::Greater => {
                    res = Some(&current.elem);
                    current.right.as_deref()
                }
                Ordering::Equal => return Some(&current.elem),
            }
        }
        res
    }

    /// Returns the least element whose name is greater or equal to `name`.
    pub fn next(&self, name: &Name) -> Option<&Elem> {
        let mut node = self.root.as_deref();
        let mut res = None;
        while let Some(current) = node {
            node = match name.cmp(current.elem.name()) {
                Ordering::Less => {
                    res = Some(&current.elem);
                    current.left.as_deref()
                }
                Ordering::Greater => current.right.as_deref(),
                Ordering::Equal => return Some(&current.elem),
            }
        }
        res
    }

    /// Returns an iterator over the elements in canonical order.
    pub fn iter(&self) -> Iter<'_> {
        let mut res = Iter { stack: Vec::new() };
        res.push_left(self.root.as_deref());
        res
    }

    /// Calls `op` for each element in canonical order.
    pub fn walk(&self, mut op: impl FnMut(&Elem)) {
        self.iter().for_each(|elem| op(elem))
    }

    /// Calls `op` for each element in canonical order with its authority.
    ///
    /// The second argument to `op` is `false` if the element’s name is
    /// strictly below a name with NS records, i.e., below a delegation.
    /// The delegation point itself is authoritative.
    pub fn auth_walk(&self, mut op: impl FnMut(&Elem, bool)) {
        // Everything below a cut directly follows it in canonical order,
        // so only the outermost current cut needs keeping.
        let mut cut: Option<&Name> = None;
        for elem in self.iter() {
            let below = cut.map_or(false, |cut| elem.name().is_below(cut));
            if !below {
                cut = None;
                if elem.contains(Rtype::NS) {
                    cut = Some(elem.name());
                }
            }
            op(elem, !below)
        }
    }

    /// Returns the glue records for a set of NS records.
    ///
    /// Only targets at or below the owner of their NS record are considered.
    /// For these, the A and AAAA records and, if `dnssec` is true, their
    /// signatures are returned.
    pub fn glue(&self, ns_records: &[Record], dnssec: bool) -> Vec<Record> {
        let mut res = Vec::new();
        for record in ns_records {
            let target = match record.data() {
                ZoneRecordData::Ns(ns) => ns.nsdname(),
                _ => continue,
            };
            if !target.ends_with(record.owner()) {
                continue;
            }
            if let Some(elem) = self.search(target) {
                res.extend(elem.rrs_with_sigs(Rtype::A, dnssec));
                res.extend(elem.rrs_with_sigs(Rtype::AAAA, dnssec));
            }
        }
        res
    }
}

//------------ Iter ----------------------------------------------------------

/// An in-order iterator over the elements of a tree.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Elem;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.elem)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Elem;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------ Color ---------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Color {
    Red,
    Black,
}

impl Color {
    fn flip(&mut self) {
        *self = match *self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

//------------ Node ----------------------------------------------------------

#[derive(Clone, Debug)]
struct Node {
    elem: Elem,
    left: Link,
    right: Link,
    color: Color,
}

/// Returns whether a link is red. Missing nodes are black.
fn is_red(link: &Link) -> bool {
    link.as_ref().map_or(false, |node| node.color == Color::Red)
}

/// Returns whether the left child of a link is red.
fn is_left_red(link: &Link) -> bool {
    link.as_ref().map_or(false, |node| is_red(&node.left))
}

impl Node {
    fn new(record: Record) -> Box<Self> {
        Box::new(Node {
            elem: Elem::new(record),
            left: None,
            right: None,
            color: Color::Red,
        })
    }

    /// Inserts a record below `link`.
    ///
    /// Returns the new subtree root and whether a new node was created.
    fn insert(link: Link, record: Record) -> (Box<Self>, bool) {
        let mut node = match link {
            Some(node) => node,
            None => return (Self::new(record), true),
        };
        let added = match record.owner().cmp(node.elem.name()) {
            Ordering::Less => {
                let (left, added) = Self::insert(node.left.take(), record);
                node.left = Some(left);
                added
            }
            Ordering::Greater => {
                let (right, added) = Self::insert(node.right.take(), record);
                node.right = Some(right);
                added
            }
            Ordering::Equal => {
                node.elem.insert(record);
                false
            }
        };

        if is_red(&node.right) && !is_red(&node.left) {
            node = node.rotate_left();
        }
        if is_red(&node.left) && is_left_red(&node.left) {
            node = node.rotate_right();
        }
        if is_red(&node.left) && is_red(&node.right) {
            node.flip_colors();
        }
        (node, added)
    }

    /// Removes the node for `name` from the subtree.
    ///
    /// The name must be present in the subtree.
    fn delete(mut node: Box<Self>, name: &Name) -> Link {
        if name < node.elem.name() {
            if node.left.is_some() {
                if !is_red(&node.left) && !is_left_red(&node.left) {
                    node = node.move_red_left();
                }
                node.left =
                    node.left.take().and_then(|left| Self::delete(left, name));
            }
        } else {
            if is_red(&node.left) {
                node = node.rotate_right();
            }
            if node.right.is_none() && name == node.elem.name() {
                return None;
            }
            if node.right.is_some() {
                if !is_red(&node.right) && !is_left_red(&node.right) {
                    node = node.move_red_right();
                }
                if name == node.elem.name() {
                    if let Some(right) = node.right.take() {
                        let (right, min) = Self::delete_min(right);
                        node.elem = min;
                        node.right = right;
                    }
                } else {
                    node.right = node
                        .right
                        .take()
                        .and_then(|right| Self::delete(right, name));
                }
            }
        }
        Some(node.fix_up())
    }

    /// Removes the smallest node of the subtree.
    ///
    /// Returns the new subtree and the element of the removed node.
    fn delete_min(mut node: Box<Self>) -> (Link, Elem) {
        let left = match node.left.take() {
            Some(left) => left,
            None => return (node.right.take(), node.elem),
        };
        node.left = Some(left);
        if !is_red(&node.left) && !is_left_red(&node.left) {
            node = node.move_red_left();
        }
        let min = match node.left.take() {
            Some(left) => {
                let (left, min) = Self::delete_min(left);
                node.left = left;
                min
            }
            None => return (node.right.take(), node.elem),
        };
        (Some(node.fix_up()), min)
    }

    fn rotate_left(mut self: Box<Self>) -> Box<Self> {
        let mut root = match self.right.take() {
            Some(root) => root,
            None => return self,
        };
        self.right = root.left.take();
        root.color = self.color;
        self.color = Color::Red;
        root.left = Some(self);
        root
    }

    fn rotate_right(mut self: Box<Self>) -> Box<Self> {
        let mut root = match self.left.take() {
            Some(root) => root,
            None => return self,
        };
        self.left = root.right.take();
        root.color = self.color;
        self.color = Color::Red;
        root.right = Some(self);
        root
    }

    fn flip_colors(&mut self) {
        self.color.flip();
        if let Some(left) = self.left.as_mut() {
            left.color.flip();
        }
        if let Some(right) = self.right.as_mut() {
            right.color.flip();
        }
    }

    fn move_red_left(mut self: Box<Self>) -> Box<Self> {
        self.flip_colors();
        if self.right.as_ref().map_or(false, |right| is_red(&right.left)) {
            self.right = self.right.take().map(Node::rotate_right);
            self = self.rotate_left();
            self.flip_colors();
        }
        self
    }

    fn move_red_right(mut self: Box<Self>) -> Box<Self> {
        self.flip_colors();
        if is_left_red(&self.left) {
            self = self.rotate_right();
            self.flip_colors();
        }
        self
    }

    fn fix_up(mut self: Box<Self>) -> Box<Self> {
        if is_red(&self.right) {
            self = self.rotate_left();
        }
        if is_red(&self.left) && is_left_red(&self.left) {
            self = self.rotate_right();
        }
        if is_red(&self.left) && is_red(&self.right) {
            self.flip_colors();
        }
        self
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::Class;
    use crate::base::record::Ttl;
    use crate::rdata::{Ns, A};
    use proptest::prelude::*;

    fn a(owner: &str) -> Record {
        Record::new(
            owner.parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            A::from_octets(192, 0, 2, 1),
        )
    }

    fn ns(owner: &str, target: &str) -> Record {
        Record::new(
            owner.parse().unwrap(),
            Class::IN,
            Ttl::HOUR,
            Ns::new(target.parse().unwrap()),
        )
    }

    fn names(tree: &Tree) -> Vec<String> {
        tree.iter().map(|elem| elem.name().to_string()).collect()
    }

    /// Checks the LLRB invariants and returns the black height.
    fn check_node(link: &Link, parent_red: bool) -> usize {
        let node = match link {
            Some(node) => node,
            None => return 1,
        };
        assert!(!is_red(&node.right), "right leaning red link");
        if node.color == Color::Red {
            assert!(!parent_red, "two consecutive red links");
        }
        let red = node.color == Color::Red;
        let left = check_node(&node.left, red);
        let right = check_node(&node.right, red);
        assert_eq!(left, right, "unequal black height");
        left + usize::from(!red)
    }

    fn check_invariants(tree: &Tree) {
        assert!(!is_red(&tree.root));
        check_node(&tree.root, false);
        let elems: Vec<_> = tree.iter().collect();
        assert_eq!(elems.len(), tree.len());
        for pair in elems.windows(2) {
            assert!(pair[0].name() < pair[1].name());
        }
    }

    #[test]
    fn insert_search_delete() {
        let mut tree = Tree::new();
        assert!(tree.search(&"example.".parse().unwrap()).is_none());
        for owner in ["a.example.", "Z.a.example.", "z.example.", "example."] {
            tree.insert(a(owner));
        }
        tree.insert(a("A.EXAMPLE."));
        check_invariants(&tree);
        assert_eq!(tree.len(), 4);
        assert_eq!(
            names(&tree),
            ["example.", "a.example.", "Z.a.example.", "z.example."]
        );
        assert!(tree.search(&"z.A.example.".parse().unwrap()).is_some());

        tree.delete(&a("a.example."));
        check_invariants(&tree);
        assert_eq!(tree.len(), 3);
        assert!(tree.search(&"a.example.".parse().unwrap()).is_none());

        // Deleting a type that is not there leaves the node alone.
        tree.delete(&ns("z.example.", "ns.z.example."));
        assert_eq!(tree.len(), 3);
        tree.delete(&a("nonexistent.example."));
        assert_eq!(tree.len(), 3);

        for owner in ["example.", "Z.a.example.", "z.example."] {
            tree.delete(&a(owner));
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn prev_next() {
        let mut tree = Tree::new();
        for owner in ["example.", "b.example.", "d.example.", "a.d.example."]
        {
            tree.insert(a(owner));
        }
        let prev = |name: &str| {
            tree.prev(&name.parse().unwrap())
                .map(|elem| elem.name().to_string())
        };
        let next = |name: &str| {
            tree.next(&name.parse().unwrap())
                .map(|elem| elem.name().to_string())
        };
        assert_eq!(prev("c.example.").as_deref(), Some("b.example."));
        assert_eq!(prev("b.example.").as_deref(), Some("b.example."));
        assert_eq!(prev("e.example.").as_deref(), Some("a.d.example."));
        assert_eq!(prev("com."), None);
        assert_eq!(next("c.example.").as_deref(), Some("d.example."));
        assert_eq!(next("d.example.").as_deref(), Some("d.example."));
        assert_eq!(next("b.d.example.").as_deref(), None);
        assert_eq!(next("a.").as_deref(), Some("example."));
    }

    #[test]
    fn auth_walk_and_glue() {
        let mut tree = Tree::new();
        tree.insert(a("www.example.org."));
        tree.insert(ns("sub.example.org.", "ns1.sub.example.org."));
        tree.insert(ns("sub.example.org.", "ns.elsewhere.net."));
        tree.insert(a("ns1.sub.example.org."));
        tree.insert(a("a.b.sub.example.org."));
        tree.insert(ns("deep.sub.example.org.", "ns.deep.sub.example.org."));
        tree.insert(a("x.deep.sub.example.org."));
        tree.insert(a("zzz.example.org."));
        tree.insert(ns("zzz.zzz.example.org.", "ns.elsewhere.net."));
        tree.insert(a("a.zzz.zzz.example.org."));

        let mut seen = Vec::new();
        tree.auth_walk(|elem, auth| {
            seen.push((elem.name().to_string(), auth));
        });
        assert_eq!(
            seen,
            [
                ("sub.example.org.".to_string(), true),
                ("a.b.sub.example.org.".to_string(), false),
                ("deep.sub.example.org.".to_string(), false),
                ("x.deep.sub.example.org.".to_string(), false),
                ("ns1.sub.example.org.".to_string(), false),
                ("www.example.org.".to_string(), true),
                ("zzz.example.org.".to_string(), true),
                ("zzz.zzz.example.org.".to_string(), true),
                ("a.zzz.zzz.example.org.".to_string(), false),
            ]
        );

        let ns = tree
            .search(&"sub.example.org.".parse().unwrap())
            .unwrap()
            .rrs(Rtype::NS)
            .to_vec();
        let glue = tree.glue(&ns, false);
        assert_eq!(glue.len(), 1);
        assert_eq!(glue[0].owner().to_string(), "ns1.sub.example.org.");
    }

    fn arb_owner() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-eA-E]", 1..4)
            .prop_map(|labels| format!("{}.example.", labels.join(".")))
    }

    proptest! {
        #[test]
        fn invariants_hold(
            ops in prop::collection::vec((any::<bool>(), arb_owner()), 1..200)
        ) {
            let mut tree = Tree::new();
            let mut reference = std::collections::BTreeSet::<Name>::new();
            for (insert, owner) in ops {
                let record = a(&owner);
                if insert {
                    reference.insert(record.owner().to_lowercase());
                    tree.insert(record.to_lowercase());
                } else {
                    reference.remove(record.owner());
                    tree.delete(&record);
                }
                check_invariants(&tree);
            }
            let expected: Vec<_> = reference.iter().cloned().collect();
            let got: Vec<_> = tree.iter().map(|elem| elem.name().clone()).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn floor_ceiling_match_reference(
            owners in prop::collection::vec(arb_owner(), 1..50),
            target in arb_owner(),
        ) {
            let mut tree = Tree::new();
            let mut reference = std::collections::BTreeSet::<Name>::new();
            for owner in owners {
                let record = a(&owner).to_lowercase();
                reference.insert(record.owner().clone());
                tree.insert(record);
            }
            let target: Name = target.parse().unwrap();
            prop_assert_eq!(
                tree.prev(&target).map(|elem| elem.name().clone()),
                reference.range(..=target.clone()).next_back().cloned()
            );
            prop_assert_eq!(
                tree.next(&target).map(|elem| elem.name().clone()),
                reference.range(target..).next().cloned()
            );
        }
    }
}
