//! CoNLL-U file parsing
//!
//! Parses CoNLL-U text into `Tree`s, one `Result` per sentence so a single
//! malformed sentence never hides the rest of a file. Files ending in `.gz`
//! are decompressed on the fly.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Features, Mention, TokenId, Tree, Word, WordId};
use flate2::read::MultiGzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines, Read};
use std::path::Path;
use thiserror::Error;

/// Error during CoNLL-U parsing
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl ParseError {
    fn new(line_num: usize, message: impl Into<String>) -> Self {
        Self {
            line_num,
            message: message.into(),
        }
    }
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl CoNLLUReader<BufReader<Box<dyn Read + Send>>> {
    /// Create a reader from a file path, decompressing `.gz` files
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let inner: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(BufReader::new(inner)))
    }
}

impl CoNLLUReader<BufReader<Cursor<String>>> {
    /// Create a reader from a string
    pub fn from_string(text: &str) -> Self {
        Self::new(BufReader::new(Cursor::new(text.to_string())))
    }
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Tree, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut tree_lines = Vec::new();
        let mut metadata = HashMap::new();
        let mut sentence_text = None;

        // Read lines until a blank line (sentence boundary) or EOF
        loop {
            self.line_num += 1;
            match self.lines.next() {
                None => {
                    if tree_lines.is_empty() {
                        return None;
                    }
                    // Last sentence without trailing blank line
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(ParseError::new(self.line_num, format!("IO error: {}", e))));
                }
                Some(Ok(line)) => {
                    let line = line.trim();

                    if line.is_empty() {
                        if !tree_lines.is_empty() {
                            break;
                        }
                        continue;
                    }

                    if let Some(comment) = line.strip_prefix('#') {
                        parse_comment(comment, &mut metadata, &mut sentence_text);
                        continue;
                    }

                    tree_lines.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_tree(tree_lines, sentence_text, metadata))
    }
}

/// Parse a comment line (without the leading #)
fn parse_comment(
    comment: &str,
    metadata: &mut HashMap<String, String>,
    sentence_text: &mut Option<String>,
) {
    if let Some((key, value)) = comment.split_once('=') {
        let key = key.trim();
        let value = value.trim();

        if key == "text" {
            *sentence_text = Some(value.to_string());
        } else {
            metadata.insert(key.to_string(), value.to_string());
        }
    }
}

/// Parse accumulated lines into a Tree
fn parse_tree(
    lines: Vec<(usize, String)>,
    sentence_text: Option<String>,
    metadata: HashMap<String, String>,
) -> Result<Tree, ParseError> {
    let mut tree = Tree::with_metadata(sentence_text, metadata);
    let mut heads = Vec::new();
    let first_line = lines.first().map(|(n, _)| *n).unwrap_or(0);

    for (line_num, line) in lines {
        if let Some((word, head)) = parse_line(&line, line_num, tree.len())? {
            tree.add_word(word);
            heads.push((line_num, head));
        }
    }

    // HEAD values refer to CoNLL-U token ids; map them onto word indices
    let index_of: HashMap<usize, WordId> = tree
        .words
        .iter()
        .map(|w| (w.token_id, w.id))
        .collect();

    for (id, (line_num, head)) in heads.into_iter().enumerate() {
        match head {
            None => {
                if tree.root_id.is_none() {
                    tree.root_id = Some(id);
                }
            }
            Some(token) => {
                let Some(&parent) = index_of.get(&token) else {
                    return Err(ParseError::new(
                        line_num,
                        format!("HEAD {} does not name a word in this sentence", token),
                    ));
                };
                if parent == id {
                    return Err(ParseError::new(line_num, "word is its own head"));
                }
                tree.set_parent(id, parent);
            }
        }
    }

    if !tree.is_empty() && tree.root_id.is_none() {
        return Err(ParseError::new(first_line, "sentence has no root"));
    }

    let mentions = parse_entities(&tree).map_err(|message| ParseError::new(first_line, message))?;
    tree.set_mentions(mentions);

    Ok(tree)
}

/// Collect coreference mentions from `Entity` MISC annotations
///
/// Uses the bracket notation of CorefUD: `(e1-person` opens a mention of
/// entity `e1`, `e1)` closes it, `(e2-thing)` is a one-word mention.
fn parse_entities(tree: &Tree) -> Result<Vec<Mention>, String> {
    let mut mentions = Vec::new();
    let mut open: Vec<(&str, Option<&str>, WordId)> = Vec::new();

    for word in &tree.words {
        let Some(mut rest) = word.misc.get("Entity") else {
            continue;
        };
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('(') {
                let end = after.find(['(', ')']).unwrap_or(after.len());
                let mut parts = after[..end].split('-');
                let entity = parts.next().unwrap_or_default();
                if entity.is_empty() {
                    return Err(format!("empty entity id in {:?}", word.form));
                }
                let kind = parts.next().filter(|k| !k.is_empty());
                rest = &after[end..];
                match rest.strip_prefix(')') {
                    Some(after) => {
                        mentions.push(new_mention(word.id, word.id, entity, kind));
                        rest = after;
                    }
                    None => open.push((entity, kind, word.id)),
                }
            } else {
                let end = rest
                    .find(')')
                    .ok_or_else(|| format!("unbalanced Entity annotation {:?}", rest))?;
                let entity = &rest[..end];
                let position = open
                    .iter()
                    .rposition(|(e, _, _)| *e == entity)
                    .ok_or_else(|| format!("entity {} closed without being opened", entity))?;
                let (entity, kind, start) = open.remove(position);
                mentions.push(new_mention(start, word.id, entity, kind));
                rest = &rest[end + 1..];
            }
        }
    }

    match open.first() {
        Some((entity, _, _)) => Err(format!("entity {} is never closed", entity)),
        None => Ok(mentions),
    }
}

fn new_mention(start: WordId, end: WordId, entity: &str, kind: Option<&str>) -> Mention {
    let mention = Mention::new(start, end, entity);
    match kind {
        Some(kind) => mention.with_kind(kind),
        None => mention,
    }
}

/// Parse a single CoNLL-U line into a word and its raw HEAD token id.
/// Returns None for multiword tokens and empty nodes.
fn parse_line(
    line: &str,
    line_num: usize,
    word_id: WordId,
) -> Result<Option<(Word, Option<usize>)>, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 10 {
        return Err(ParseError::new(
            line_num,
            format!("Expected 10 fields, found {}", fields.len()),
        ));
    }

    let token_id = match parse_id(fields[0]).map_err(|m| ParseError::new(line_num, m))? {
        TokenId::Single(id) => id,
        TokenId::Range(_, _) | TokenId::Decimal(_, _) => return Ok(None),
    };

    let form = fields[1].to_string();
    let lemma = if fields[2] == "_" {
        form.clone()
    } else {
        fields[2].to_string()
    };
    let xpos = (fields[4] != "_").then(|| fields[4].to_string());
    let head = parse_head(fields[6]).map_err(|m| ParseError::new(line_num, m))?;

    let word = Word {
        id: word_id,
        token_id,
        form,
        lemma,
        upos: fields[3].to_string(),
        xpos,
        feats: parse_pairs(fields[5]),
        deprel: fields[7].to_string(),
        misc: parse_pairs(fields[9]),
        head: None,
        children: Vec::new(),
    };

    Ok(Some((word, head)))
}

/// Parse ID field (can be integer, range, or decimal)
fn parse_id(s: &str) -> Result<TokenId, String> {
    let number = |part: &str| {
        part.parse::<usize>()
            .map_err(|_| format!("Invalid ID: {}", s))
    };

    if let Some((start, end)) = s.split_once('-') {
        Ok(TokenId::Range(number(start)?, number(end)?))
    } else if let Some((main, sub)) = s.split_once('.') {
        Ok(TokenId::Decimal(number(main)?, number(sub)?))
    } else {
        Ok(TokenId::Single(number(s)?))
    }
}

/// Parse HEAD field; `None` for the root
fn parse_head(s: &str) -> Result<Option<usize>, String> {
    if s == "0" || s == "_" {
        return Ok(None);
    }
    s.parse::<usize>()
        .map(Some)
        .map_err(|_| format!("Invalid HEAD: {}", s))
}

/// Parse FEATS or MISC field (key=value|key=value)
fn parse_pairs(s: &str) -> Features {
    let mut feats = Features::new();

    if s == "_" {
        return feats;
    }

    for pair in s.split('|') {
        if let Some((key, value)) = pair.split_once('=') {
            feats.insert(key, value);
        }
    }

    feats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_sentence() {
        let conllu = r#"# text = The dog runs.
1	The	the	DET	DT	_	2	det	_	_
2	dog	dog	NOUN	NN	_	3	nsubj	_	_
3	runs	run	VERB	VBZ	_	0	root	_	SpaceAfter=No
4	.	.	PUNCT	.	_	3	punct	_	_

"#;

        let mut reader = CoNLLUReader::from_string(conllu);
        let tree = reader.next().unwrap().unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.sentence_text, Some("The dog runs.".to_string()));
        assert_eq!(tree.root_id, Some(2));

        assert_eq!(tree.words[0].form, "The");
        assert_eq!(tree.words[0].upos, "DET");
        assert_eq!(tree.words[0].xpos.as_deref(), Some("DT"));
        assert_eq!(tree.words[2].head, None);
        assert_eq!(tree.children(2), &[1, 3]);
        assert_eq!(tree.words[2].misc.get("SpaceAfter"), Some("No"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_parse_with_features() {
        let conllu = "1\tdogs\tdog\tNOUN\tNNS\tNumber=Plur\t2\tnsubj\t_\t_\n\
                      2\trun\trun\tVERB\tVBP\tNumber=Plur|Tense=Pres\t0\troot\t_\t_\n";

        let tree = CoNLLUReader::from_string(conllu).next().unwrap().unwrap();

        assert_eq!(tree.words[0].feats.get("Number"), Some("Plur"));
        assert_eq!(tree.words[1].feats.get("Tense"), Some("Pres"));
    }

    #[test]
    fn test_multiword_tokens_are_skipped() {
        let conllu = "1-2\tdel\t_\t_\t_\t_\t_\t_\t_\t_\n\
                      1\tde\tde\tADP\t_\t_\t2\tcase\t_\t_\n\
                      2\tel\tel\tDET\t_\t_\t0\troot\t_\t_\n";

        let tree = CoNLLUReader::from_string(conllu).next().unwrap().unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.head(0), Some(1));
    }

    #[test]
    fn test_bad_sentence_does_not_hide_the_next() {
        let conllu = "1\tdog\tdog\tNOUN\t_\t_\t7\tnsubj\t_\t_\n\
                      \n\
                      1\truns\trun\tVERB\t_\t_\t0\troot\t_\t_\n";

        let results: Vec<_> = CoNLLUReader::from_string(conllu).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = CoNLLUReader::from_string("1\tdog\tdog\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.line_num, 1);
        assert!(err.message.contains("Expected 10 fields"));
    }

    #[test]
    fn test_entity_annotations() {
        let conllu = "1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\tEntity=(e1-animal\n\
                      2\tdog\tdog\tNOUN\t_\t_\t3\tnsubj\t_\tEntity=e1)\n\
                      3\tbit\tbite\tVERB\t_\t_\t0\troot\t_\t_\n\
                      4\tits\tits\tPRON\t_\t_\t5\tnmod:poss\t_\tEntity=(e2-animal(e1-animal)\n\
                      5\ttail\ttail\tNOUN\t_\t_\t3\tobj\t_\tEntity=e2)\n";

        let tree = CoNLLUReader::from_string(conllu).next().unwrap().unwrap();

        assert_eq!(tree.mentions.len(), 3);
        assert_eq!((tree.mentions[0].start, tree.mentions[0].end), (0, 1));
        assert_eq!(tree.mentions[0].entity, "e1");
        assert_eq!(tree.mentions[0].kind.as_deref(), Some("animal"));
        assert_eq!(tree.mentions[0].head, 1);
        assert_eq!((tree.mentions[1].start, tree.mentions[1].end), (3, 3));
        assert_eq!(tree.mentions[1].entity, "e1");
        assert_eq!((tree.mentions[2].start, tree.mentions[2].end), (3, 4));
        assert_eq!(tree.mentions[2].head, 4);
        assert!(tree.coreferent(0, 1));
    }

    #[test]
    fn test_unbalanced_entities_are_errors() {
        let unclosed = "1\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\tEntity=(e1\n";
        let err = CoNLLUReader::from_string(unclosed).next().unwrap().unwrap_err();
        assert!(err.message.contains("never closed"));

        let unopened = "1\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\tEntity=e3)\n";
        let err = CoNLLUReader::from_string(unopened).next().unwrap().unwrap_err();
        assert!(err.message.contains("closed without being opened"));
    }

    #[test]
    fn test_parse_id_variants() {
        assert_eq!(parse_id("42").unwrap(), TokenId::Single(42));
        assert_eq!(parse_id("5-7").unwrap(), TokenId::Range(5, 7));
        assert_eq!(parse_id("10.5").unwrap(), TokenId::Decimal(10, 5));
        assert!(parse_id("x").is_err());
    }

    #[test]
    fn test_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.conllu.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::fast());
        encoder
            .write_all(b"1\truns\trun\tVERB\t_\t_\t0\troot\t_\t_\n")
            .unwrap();
        encoder.finish().unwrap();

        let trees: Vec<_> = CoNLLUReader::from_file(&path).unwrap().collect();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].as_ref().unwrap().words[0].lemma, "run");
    }
}
