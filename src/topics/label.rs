// Label selection — picking the one term that names a cluster.
//
// Candidates arrive ranked by TF-IDF weight. The first candidate that
// survives every filter in the chain becomes the cluster's label; there
// is no secondary scoring among survivors. That keeps the policy strictly
// weight-rank-driven, and it means adding or removing a filter never
// restructures the scan.

use std::collections::HashSet;
use std::sync::LazyLock;

/// How many top-weighted candidates to consider per cluster.
pub const MAX_CANDIDATES: usize = 20;

/// Minimum length (in characters) of an acceptable label.
const MIN_LABEL_LEN: usize = 4;

/// Conversational filler that survives general-language stopword removal
/// but makes a useless topic label. A second, chat-specific layer on top
/// of the baseline English list used during term weighting.
static CHAT_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "don", "did", "just", "like", "yeah", "okay", "ok", "lol", "omg", "hey",
        "hello", "hi", "good", "bad", "think", "know", "want", "going", "gonna",
        "wanna", "got", "make", "really", "right", "time", "come", "said", "say",
        "tell", "look", "see", "thing", "need", "maybe", "way", "day", "night",
        "wait", "feel", "let", "sure", "actually", "probably", "stuff", "yes", "no",
        "tomorrow", "today", "yesterday", "tonight", "morning", "afternoon",
        "evening", "thanks", "thank", "nice", "cool", "sorry", "fine", "getting",
        "went", "guys", "man", "bro", "dude", "girl", "people", "would", "could",
        "should", "have", "has", "had", "will", "can", "whats", "thats", "theres",
        "dont", "didnt", "cant", "wont", "isnt", "arent", "wasnt", "werent",
        "havent", "hasnt", "hadnt", "wouldnt", "couldnt", "shouldnt", "im", "youre",
        "hes", "shes", "theyre", "weve", "youve", "ill", "voice", "message",
        "omitted",
    ]
    .into_iter()
    .collect()
});

/// One predicate in the label filter chain. Returns true when the
/// candidate term is acceptable.
pub type LabelFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// The standard filter chain, in evaluation order: chat stoplist,
/// caller-supplied stoplist, minimum length, digit exclusion.
///
/// The stoplist filters split the candidate on whitespace so a bigram is
/// rejected when either of its words is stoplisted.
pub fn default_filters(extra_stopwords: &[String]) -> Vec<LabelFilter> {
    let extra: HashSet<String> = extra_stopwords.iter().cloned().collect();
    vec![
        Box::new(|term: &str| {
            term.split_whitespace().all(|w| !CHAT_STOPWORDS.contains(w))
        }),
        Box::new(move |term: &str| {
            term.split_whitespace().all(|w| !extra.contains(w))
        }),
        Box::new(|term: &str| term.chars().count() >= MIN_LABEL_LEN),
        Box::new(|term: &str| !term.chars().any(|c| c.is_ascii_digit())),
    ]
}

/// Scan ranked candidates and return the first one passing every filter.
///
/// At most [`MAX_CANDIDATES`] are examined; a cluster whose top candidates
/// are all rejected simply produces no label.
pub fn select_label<'a, I>(candidates: I, filters: &[LabelFilter]) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .take(MAX_CANDIDATES)
        .find(|term| filters.iter().all(|accept| accept(term)))
        .map(str::to_string)
}
