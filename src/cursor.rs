//! Flyweight navigator over one sentence
//!
//! A `Cursor` is a sentence reference plus a small position value. Workers
//! keep one cursor for their whole slice and re-attach it to each sentence;
//! feature extraction reads through it without allocating.
//!
//! Positions are word indices, except for coreference content where they
//! index the sentence's mentions; word features then read the mention's
//! head word.

use crate::corpus::ContentType;
use crate::tree::{Mention, MentionId, Tree, Word, WordId};
use thiserror::Error;

pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const DIRECTIONS: &[&str] = &[LEFT, RIGHT];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor has no {0} position")]
    InvalidState(&'static str),

    #[error("position {index} is outside the sentence (length {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("malformed sentence at word {index}: {reason}")]
    Malformed { index: usize, reason: &'static str },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor<'a> {
    tree: Option<&'a Tree>,
    content: ContentType,
    node: Option<usize>,
    edge: Option<(usize, usize)>,
}

impl<'a> Cursor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a sentence, dropping any position from the previous one
    pub fn attach(&mut self, tree: &'a Tree) {
        self.attach_as(tree, ContentType::Dependency);
    }

    /// Attach to a sentence viewed as the given content type
    pub fn attach_as(&mut self, tree: &'a Tree, content: ContentType) {
        self.tree = Some(tree);
        self.content = content;
        self.node = None;
        self.edge = None;
    }

    pub fn content_type(&self) -> ContentType {
        self.content
    }

    /// Forget the sentence and every position
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn tree(&self) -> Result<&'a Tree, CursorError> {
        self.tree.ok_or(CursorError::InvalidState("sentence"))
    }

    /// Number of positions: mentions for coreference content, words otherwise
    pub fn len(&self) -> usize {
        match (self.tree, self.content) {
            (None, _) => 0,
            (Some(tree), ContentType::Coreference) => tree.mentions.len(),
            (Some(tree), _) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inspect the position `index`; clears the edge position
    pub fn move_to(&mut self, index: usize) -> Result<(), CursorError> {
        self.check_index(index)?;
        self.node = Some(index);
        self.edge = None;
        Ok(())
    }

    /// Inspect the edge `source -> target`; the node position becomes `target`
    pub fn move_to_edge(&mut self, source: usize, target: usize) -> Result<(), CursorError> {
        self.check_index(source)?;
        self.check_index(target)?;
        self.node = Some(target);
        self.edge = Some((source, target));
        Ok(())
    }

    pub fn position(&self) -> Option<usize> {
        self.node
    }

    pub fn edge(&self) -> Option<(usize, usize)> {
        self.edge
    }

    fn check_index(&self, index: usize) -> Result<(), CursorError> {
        self.tree()?;
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(CursorError::OutOfBounds { index, len })
        }
    }

    /// Word read at a position
    fn word_at(&self, position: usize) -> Result<(WordId, &'a Word), CursorError> {
        let tree = self.tree()?;
        let index = match self.content {
            ContentType::Coreference => self.mention_at(position)?.head,
            _ => position,
        };
        let word = tree
            .word(index)
            .ok_or(CursorError::OutOfBounds { index, len: tree.len() })?;
        Ok((index, word))
    }

    fn mention_at(&self, id: MentionId) -> Result<&'a Mention, CursorError> {
        let tree = self.tree()?;
        tree.mention(id).ok_or(CursorError::OutOfBounds {
            index: id,
            len: tree.mentions.len(),
        })
    }

    fn current(&self) -> Result<(WordId, &'a Word), CursorError> {
        let position = self.node.ok_or(CursorError::InvalidState("node"))?;
        self.word_at(position)
    }

    fn current_mention(&self) -> Result<(MentionId, &'a Mention), CursorError> {
        if self.content != ContentType::Coreference {
            return Err(CursorError::InvalidState("mention"));
        }
        let id = self.node.ok_or(CursorError::InvalidState("node"))?;
        Ok((id, self.mention_at(id)?))
    }

    fn current_edge(&self) -> Result<(WordId, WordId), CursorError> {
        self.tree()?;
        self.edge.ok_or(CursorError::InvalidState("edge"))
    }

    // Node features

    pub fn form(&self) -> Result<&'a str, CursorError> {
        Ok(&self.current()?.1.form)
    }

    pub fn lemma(&self) -> Result<&'a str, CursorError> {
        Ok(&self.current()?.1.lemma)
    }

    pub fn upos(&self) -> Result<&'a str, CursorError> {
        Ok(&self.current()?.1.upos)
    }

    pub fn xpos(&self) -> Result<Option<&'a str>, CursorError> {
        Ok(self.current()?.1.xpos.as_deref())
    }

    /// Dependency relation to the head
    pub fn relation(&self) -> Result<&'a str, CursorError> {
        Ok(&self.current()?.1.deprel)
    }

    pub fn feature(&self, key: &str) -> Result<Option<&'a str>, CursorError> {
        Ok(self.current()?.1.feats.get(key))
    }

    pub fn misc(&self, key: &str) -> Result<Option<&'a str>, CursorError> {
        Ok(self.current()?.1.misc.get(key))
    }

    /// Head of the current word, validated against the sentence length
    pub fn head(&self) -> Result<Option<WordId>, CursorError> {
        let (index, word) = self.current()?;
        match word.head {
            Some(head) if head >= self.tree()?.len() => Err(CursorError::Malformed {
                index,
                reason: "head outside sentence",
            }),
            head => Ok(head),
        }
    }

    pub fn is_root(&self) -> Result<bool, CursorError> {
        Ok(self.head()?.is_none())
    }

    pub fn child_count(&self) -> Result<usize, CursorError> {
        Ok(self.current()?.1.children.len())
    }

    /// |index - head|; `None` at the root
    pub fn distance(&self) -> Result<Option<i64>, CursorError> {
        let (index, _) = self.current()?;
        Ok(self.head()?.map(|head| index.abs_diff(head) as i64))
    }

    /// Side of the head the current word sits on; `None` at the root
    pub fn direction(&self) -> Result<Option<&'static str>, CursorError> {
        let (index, _) = self.current()?;
        Ok(self
            .head()?
            .map(|head| if index < head { LEFT } else { RIGHT }))
    }

    /// Number of dominance steps from the current word up to the root
    pub fn depth(&self) -> Result<usize, CursorError> {
        let (index, _) = self.current()?;
        let tree = self.tree()?;
        let mut depth = 0;
        let mut current = index;
        while let Some(head) = tree.head(current) {
            depth += 1;
            if depth > tree.len() || head >= tree.len() {
                return Err(CursorError::Malformed {
                    index,
                    reason: "head chain does not reach a root",
                });
            }
            current = head;
        }
        Ok(depth)
    }

    /// Position scaled to 0.0..=1.0 over the sentence
    pub fn relative_position(&self) -> Result<f64, CursorError> {
        let (index, _) = self.current()?;
        let len = self.tree()?.len();
        Ok(if len <= 1 {
            0.0
        } else {
            index as f64 / (len - 1) as f64
        })
    }

    // Mention features

    pub fn mention(&self) -> Result<&'a Mention, CursorError> {
        Ok(self.current_mention()?.1)
    }

    /// Entity type of the current mention
    pub fn entity_kind(&self) -> Result<Option<&'a str>, CursorError> {
        Ok(self.mention()?.kind.as_deref())
    }

    pub fn mention_length(&self) -> Result<usize, CursorError> {
        Ok(self.mention()?.word_count())
    }

    /// Mentions of the current mention's entity in this sentence
    pub fn cluster_size(&self) -> Result<usize, CursorError> {
        let (id, _) = self.current_mention()?;
        Ok(self.tree()?.cluster_size(id))
    }

    /// No earlier mention in the sentence refers to the same entity
    pub fn is_first_mention(&self) -> Result<bool, CursorError> {
        let (id, mention) = self.current_mention()?;
        let earlier = &self.tree()?.mentions[..id];
        Ok(!earlier.iter().any(|m| m.entity == mention.entity))
    }

    // Edge features

    /// Relation carried by the edge, i.e. the target's relation
    pub fn edge_relation(&self) -> Result<&'a str, CursorError> {
        let (_, target) = self.current_edge()?;
        Ok(&self.word_at(target)?.1.deprel)
    }

    pub fn edge_distance(&self) -> Result<i64, CursorError> {
        let (source, target) = self.current_edge()?;
        Ok(source.abs_diff(target) as i64)
    }

    /// Side of the source the edge target sits on
    pub fn edge_direction(&self) -> Result<&'static str, CursorError> {
        let (source, target) = self.current_edge()?;
        Ok(if target < source { LEFT } else { RIGHT })
    }

    /// Words strictly between the two mentions of the edge; 0 when they touch or overlap
    pub fn edge_gap(&self) -> Result<i64, CursorError> {
        let (source, target) = self.current_edge()?;
        if self.content != ContentType::Coreference {
            return Err(CursorError::InvalidState("mention"));
        }
        let (a, b) = (self.mention_at(source)?, self.mention_at(target)?);
        let (first, second) = if a.start <= b.start { (a, b) } else { (b, a) };
        Ok(second.start.saturating_sub(first.end + 1) as i64)
    }

    // Structural relations between two positions

    /// `source` is the head of `target`
    pub fn dominates(&self, source: WordId, target: WordId) -> Result<bool, CursorError> {
        let tree = self.tree()?;
        Ok(tree.head(target) == Some(source))
    }

    /// Both mentions refer to the same entity
    pub fn coreferent(&self, source: MentionId, target: MentionId) -> Result<bool, CursorError> {
        Ok(self.tree()?.coreferent(source, target))
    }

    /// `target` is reachable from `source` by zero or more dominance steps
    pub fn reaches(&self, source: WordId, target: WordId) -> Result<bool, CursorError> {
        let tree = self.tree()?;
        let mut current = target;
        for _ in 0..=tree.len() {
            if current == source {
                return Ok(true);
            }
            match tree.head(current) {
                Some(head) if head < tree.len() => current = head,
                Some(_) => {
                    return Err(CursorError::Malformed {
                        index: current,
                        reason: "head outside sentence",
                    });
                }
                None => return Ok(false),
            }
        }
        Err(CursorError::Malformed {
            index: target,
            reason: "head chain does not reach a root",
        })
    }
}
