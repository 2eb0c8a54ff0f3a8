//! Breadth-first walk over every struct reachable from the root

use crate::coerce::{coerce, Registry};
use crate::error::{Error, Location};
use crate::source::Source;
use crate::tag::Tag;
use crate::value::{identity, Field, Node, SharedNode, Slot, Struct};
use std::any::TypeId;
use std::collections::{HashSet, VecDeque};

/// Where a queued struct is reached from.
#[derive(Clone)]
enum Anchor {
    Root,
    Shared(SharedNode),
}

/// A struct waiting for its turn: the field indices leading to it from its
/// anchor. Holding no borrow lets structs behind different cells sit in one
/// queue.
struct Pending {
    anchor: Anchor,
    path: Vec<usize>,
}

impl Pending {
    fn shared(node: SharedNode) -> Self {
        Self {
            anchor: Anchor::Shared(node),
            path: Vec::new(),
        }
    }

    fn child(&self, field: usize) -> Self {
        let mut path = self.path.clone();
        path.push(field);
        Self {
            anchor: self.anchor.clone(),
            path,
        }
    }
}

/// Follow `path` from `s` through the inline struct held by each field.
fn resolve<'a>(
    s: &'a mut (dyn Struct + 'static),
    path: &[usize],
) -> Option<&'a mut (dyn Struct + 'static)> {
    let Some((&index, rest)) = path.split_first() else {
        return Some(s);
    };
    let field = s.fields().into_iter().nth(index)?;
    let Slot::Writable { value, .. } = field.slot else {
        return None;
    };
    let mut children = VecDeque::new();
    value.children(&mut children);
    match children.pop_front() {
        Some(Node::Inline(next)) => resolve(next, rest),
        _ => None,
    }
}

/// State of one walk. Created per call and dropped when it returns.
pub(crate) struct Walker<'c> {
    source: &'c dyn Source,
    registry: &'c Registry,
    visited: HashSet<(TypeId, usize)>,
}

impl<'c> Walker<'c> {
    pub(crate) fn new(source: &'c dyn Source, registry: &'c Registry) -> Self {
        Self {
            source,
            registry,
            visited: HashSet::new(),
        }
    }

    /// Visit every struct reachable from `root`, each instance once, level by
    /// level and in field order within a level.
    ///
    /// A shared struct is borrowed only while one of the structs inside it is
    /// being visited.
    pub(crate) fn walk(&mut self, root: Node<'_>) -> Result<(), Error> {
        let (mut root, first) = match root {
            Node::Inline(s) => (
                Some(s),
                Pending {
                    anchor: Anchor::Root,
                    path: Vec::new(),
                },
            ),
            Node::Shared(shared) => (None, Pending::shared(shared)),
        };
        let mut queue = VecDeque::from([first]);

        while let Some(pending) = queue.pop_front() {
            match &pending.anchor {
                Anchor::Root => {
                    let Some(s) = root
                        .as_deref_mut()
                        .and_then(|root| resolve(root, &pending.path))
                    else {
                        tracing::trace!("struct no longer reachable");
                        continue;
                    };
                    if self.mark(identity(s)) {
                        self.visit(s, &pending, &mut queue)?;
                    }
                }
                Anchor::Shared(shared) => {
                    if pending.path.is_empty() && !self.mark(shared.identity()) {
                        continue;
                    }
                    let mut guard =
                        shared
                            .cell
                            .try_borrow_mut()
                            .map_err(|_| Error::Borrowed {
                                type_name: shared.type_name,
                            })?;
                    let Some(s) = resolve(&mut *guard, &pending.path) else {
                        tracing::trace!("struct no longer reachable");
                        continue;
                    };
                    if pending.path.is_empty() || self.mark(identity(s)) {
                        self.visit(s, &pending, &mut queue)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Record a struct instance as visited. Returns false if it already was.
    fn mark(&mut self, identity: (TypeId, usize)) -> bool {
        let inserted = self.visited.insert(identity);
        if !inserted {
            tracing::trace!("skipping already visited struct");
        }
        inserted
    }

    /// Process every field of `s`, then queue the structs its fields lead to.
    fn visit(
        &mut self,
        s: &mut (dyn Struct + 'static),
        at: &Pending,
        queue: &mut VecDeque<Pending>,
    ) -> Result<(), Error> {
        let struct_name = s.struct_name();
        let style = s.tag_style();
        tracing::trace!(struct_name, depth = at.path.len(), "visiting struct");

        for (index, field) in s.fields().into_iter().enumerate() {
            let Field {
                name,
                type_name,
                tag,
                slot,
            } = field;
            let location = Location {
                struct_name,
                field: name,
                type_name,
            };
            let tag = tag
                .map(|raw| Tag::parse(raw, style.separator))
                .filter(|tag| !tag.is_skipped());

            match slot {
                Slot::Unsettable => {
                    if tag.is_some() {
                        return Err(Error::Unsettable { location });
                    }
                }
                Slot::Writable { shape, value } => {
                    if let Some(tag) = tag {
                        let Some(strategy) = self.registry.strategy(&shape) else {
                            return Err(Error::Unsupported { location });
                        };
                        let key = format!("{}{}", style.prefix, tag.key);
                        let found =
                            self.source
                                .lookup(&key)
                                .map_err(|source| Error::Lookup {
                                    key: key.clone(),
                                    location: location.clone(),
                                    source,
                                })?;
                        let origin = if found.is_some() { "source" } else { "default" };
                        if let Some(raw) = found.as_deref().or(tag.default) {
                            coerce(&strategy, &mut *value, raw).map_err(|source| {
                                Error::Coerce {
                                    key: key.clone(),
                                    location,
                                    source,
                                }
                            })?;
                            tracing::debug!(
                                struct_name,
                                field = name,
                                key = %key,
                                origin,
                                "field set"
                            );
                        }
                    }
                    let mut children = VecDeque::new();
                    value.children(&mut children);
                    for child in children {
                        queue.push_back(match child {
                            Node::Inline(_) => at.child(index),
                            Node::Shared(shared) => Pending::shared(shared),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
