//! Sentence data structures searched by the engine
//!
//! A `Tree` is an index-based word array: each word knows its head (parent)
//! index and the indices of its dependents. The same structure doubles as a
//! plain token sequence for n-gram search. Coreference annotation is kept
//! as a list of mentions: word spans tagged with the entity they refer to.

use std::collections::HashMap;

/// Index of a word within its sentence (0-based)
pub type WordId = usize;

/// CoNLL-U token identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    Single(usize),
    Range(usize, usize),
    Decimal(usize, usize),
}

/// Key/value annotations (FEATS or MISC), kept sorted by key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, String)>);

impl Features {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.binary_search_by(|(k, _)| k.as_str().cmp(&key)) {
            Ok(pos) => self.0[pos].1 = value,
            Err(pos) => self.0.insert(pos, (key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|pos| self.0[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A word (token) in a sentence
#[derive(Debug, Clone)]
pub struct Word {
    pub id: WordId,
    pub token_id: usize,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: Option<String>,
    pub feats: Features,
    pub deprel: String,
    pub misc: Features,
    pub head: Option<WordId>,
    pub children: Vec<WordId>,
}

impl Word {
    /// Create a new word with the given attributes and no head
    pub fn new(id: WordId, form: &str, lemma: &str, upos: &str, deprel: &str) -> Self {
        Self {
            id,
            token_id: id + 1,
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: None,
            feats: Features::new(),
            deprel: deprel.to_string(),
            misc: Features::new(),
            head: None,
            children: Vec::new(),
        }
    }

    pub fn with_feature(mut self, key: &str, value: &str) -> Self {
        self.feats.insert(key, value);
        self
    }
}

/// Index of a mention within its sentence, in start order
pub type MentionId = usize;

/// A span of words referring to an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub start: WordId,
    /// Last word of the span (inclusive)
    pub end: WordId,
    /// Entity (cluster) identifier; mentions sharing it corefer
    pub entity: String,
    /// Entity type, e.g. `person`
    pub kind: Option<String>,
    /// Syntactic head of the span, set by `Tree::set_mentions`
    pub head: WordId,
}

impl Mention {
    pub fn new(start: WordId, end: WordId, entity: &str) -> Self {
        Self {
            start,
            end,
            entity: entity.to_string(),
            kind: None,
            head: start,
        }
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    /// Number of words in the span
    pub fn word_count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn contains(&self, word: WordId) -> bool {
        (self.start..=self.end).contains(&word)
    }
}

/// A dependency tree (sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub words: Vec<Word>,
    pub root_id: Option<WordId>,
    pub sentence_text: Option<String>,
    pub metadata: HashMap<String, String>,
    pub mentions: Vec<Mention>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(sentence_text: Option<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            words: Vec::new(),
            root_id: None,
            sentence_text,
            metadata,
            mentions: Vec::new(),
        }
    }

    /// Build a tree from parallel (form, upos, deprel, head) rows
    ///
    /// Heads are 0-based word indices; `None` marks the root. Lemmas default
    /// to the lowercased form.
    pub fn from_rows(rows: &[(&str, &str, &str, Option<WordId>)]) -> Self {
        let mut tree = Tree::new();
        for (id, (form, upos, deprel, _)) in rows.iter().enumerate() {
            tree.add_word(Word::new(id, form, &form.to_lowercase(), upos, deprel));
        }
        for (id, (_, _, _, head)) in rows.iter().enumerate() {
            if let Some(head) = head {
                tree.set_parent(id, *head);
            } else if tree.root_id.is_none() {
                tree.root_id = Some(id);
            }
        }
        tree
    }

    /// Add a word to the tree
    pub fn add_word(&mut self, word: Word) -> WordId {
        let id = word.id;
        self.words.push(word);
        id
    }

    /// Set the head of a word, registering it as a dependent of the head
    pub fn set_parent(&mut self, child_id: WordId, parent_id: WordId) {
        if let Some(child) = self.words.get_mut(child_id) {
            child.head = Some(parent_id);
        }
        if let Some(parent) = self.words.get_mut(parent_id) {
            parent.children.push(child_id);
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, id: WordId) -> Option<&Word> {
        self.words.get(id)
    }

    /// Head of a word; `None` at the root or for an unknown id
    pub fn head(&self, id: WordId) -> Option<WordId> {
        self.words.get(id).and_then(|w| w.head)
    }

    pub fn children(&self, id: WordId) -> &[WordId] {
        self.words
            .get(id)
            .map(|w| w.children.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the sentence's mentions
    ///
    /// Mentions are ordered by start, then end, and each gets the first word
    /// of its span whose head lies outside the span as its head. Spans
    /// reaching past the sentence are clipped to its last word.
    pub fn set_mentions(&mut self, mentions: impl IntoIterator<Item = Mention>) {
        let last = self.words.len().saturating_sub(1);
        self.mentions = mentions
            .into_iter()
            .map(|mut mention| {
                mention.end = mention.end.min(last);
                mention.start = mention.start.min(mention.end);
                mention.head = (mention.start..=mention.end)
                    .find(|&w| self.head(w).is_none_or(|h| !mention.contains(h)))
                    .unwrap_or(mention.start);
                mention
            })
            .collect();
        self.mentions.sort_by_key(|m| (m.start, m.end));
    }

    pub fn mention(&self, id: MentionId) -> Option<&Mention> {
        self.mentions.get(id)
    }

    /// Mentions of the same entity in this sentence, `id` included
    pub fn cluster_size(&self, id: MentionId) -> usize {
        match self.mentions.get(id) {
            Some(mention) => self
                .mentions
                .iter()
                .filter(|m| m.entity == mention.entity)
                .count(),
            None => 0,
        }
    }

    /// Whether two mentions refer to the same entity
    pub fn coreferent(&self, a: MentionId, b: MentionId) -> bool {
        match (self.mentions.get(a), self.mentions.get(b)) {
            (Some(a), Some(b)) => a.entity == b.entity,
            _ => false,
        }
    }

    /// Words of a mention joined by spaces
    pub fn mention_text(&self, id: MentionId) -> Option<String> {
        let mention = self.mentions.get(id)?;
        let forms: Vec<&str> = self
            .words
            .get(mention.start..=mention.end)?
            .iter()
            .map(|w| w.form.as_str())
            .collect();
        Some(forms.join(" "))
    }

    /// Visible text of the sentence, falling back to space-joined forms
    pub fn text(&self) -> String {
        match &self.sentence_text {
            Some(text) => text.clone(),
            None => self
                .words
                .iter()
                .map(|w| w.form.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
