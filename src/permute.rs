//! Permutation generators.
//!
//! Every generator is a pure function of a [`ParsedDomain`] and an optional cap.
//! Output is in generation order, free of duplicates and of the original domain,
//! and truncated to the first `cap` entries when a cap is given.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use tracing::debug;

use crate::attack::{AttackKind, AttackSelection};
use crate::candidates::CandidateSet;
use crate::domain::ParsedDomain;

lazy_static! {
    static ref HOMOGLYPHS: HashMap<char, &'static [char]> = {
        let table: [(char, &'static [char]); 30] = [
            ('a', &['à', 'á', 'â', 'ã', 'ä', 'å', 'ɑ', 'а', 'ạ', 'ǎ', 'ă', 'ȧ', 'ӓ']),
            ('b', &['d', 'ʙ', 'ɓ', 'ḃ', 'ḅ', 'ḇ', 'ƅ']),
            ('c', &['ϲ', 'с', 'ƈ', 'ċ', 'ć', 'ç', 'č', 'ĉ']),
            ('d', &['b', 'ԁ', 'ժ', 'ɗ', 'ď', 'đ', 'ḋ', 'ḍ', 'ḏ', 'ḑ', 'ḓ']),
            ('e', &['é', 'è', 'ê', 'ë', 'ē', 'ĕ', 'ě', 'ė', 'ẹ', 'ę', 'ȩ', 'ҽ', 'ӗ', 'е']),
            ('f', &['ϝ', 'ƒ', 'ḟ']),
            ('g', &['q', 'ɢ', 'ɡ', 'ġ', 'ğ', 'ց', 'ǵ', 'ģ']),
            ('h', &['һ', 'ḣ', 'ḥ', 'ḧ', 'ḩ', 'ḫ', 'ħ']),
            ('i', &['1', 'l', 'í', 'ì', 'ï', 'î', 'ı', 'ɩ', 'ι', 'ꙇ', 'ǐ', 'ĭ', 'ɪ']),
            ('j', &['ј', 'ʝ', 'ϳ', 'ɉ', 'ĵ']),
            ('k', &['κ', 'ʞ', 'ќ', 'ķ', 'ҝ', 'ḱ', 'ḳ', 'ḵ']),
            ('l', &['1', 'i', 'ʟ', 'ι', 'ӏ', 'ĺ', 'ļ', 'ľ', 'ḷ', 'ḹ', 'ḻ', 'ḽ']),
            ('m', &['n', 'ṁ', 'ṃ', 'ᴍ', 'м', 'ɱ']),
            ('n', &['m', 'r', 'ń', 'ṅ', 'ņ', 'ṇ', 'ṉ', 'ñ', 'ŋ', 'ɲ', 'ƞ', 'ӈ', 'ȵ']),
            ('o', &['0', 'ο', 'о', 'ȯ', 'ọ', 'ỏ', 'ơ', 'ó', 'ö', 'ӧ']),
            ('p', &['ρ', 'р', 'ƿ', 'ṗ', 'ṕ']),
            ('q', &['g', 'զ', 'ԛ', 'գ', 'ʠ']),
            ('r', &['ʀ', 'ɼ', 'ɽ', 'ŕ', 'ŗ', 'ř', 'ṙ', 'ṛ', 'ṝ', 'ṟ']),
            ('s', &['5', 'ѕ', 'ʂ', 'ś', 'ṣ', 'ṡ', 'ş', 'š', 'ș']),
            ('t', &['τ', 'т', 'ţ', 'ť', 'ṫ', 'ṭ', 'ț', 'ṱ', 'ṯ']),
            ('u', &['υ', 'ս', 'ʋ', 'ū', 'ú', 'ù', 'ü', 'û', 'ũ', 'ų', 'ụ', 'ủ', 'ư', 'ǔ', 'ŭ']),
            ('v', &['ν', 'ѵ', 'ṿ', 'ʋ', 'ᶌ', 'ṽ', 'ⱱ']),
            ('w', &['ʍ', 'ẁ', 'ẃ', 'ẅ', 'ẇ', 'ẉ', 'ŵ', 'ⱳ']),
            ('x', &['х', 'ҳ', 'ẋ', 'ẍ']),
            ('y', &['ʏ', 'у', 'ý', 'ÿ', 'ŷ', 'ẏ', 'ỳ', 'ỵ', 'ỷ', 'ỹ']),
            ('z', &['2', 'ʐ', 'ż', 'ź', 'ž', 'ẓ', 'ẕ', 'ⱬ']),
            ('0', &['o', 'ο', 'о']),
            ('1', &['l', 'i', 'ӏ']),
            ('2', &['z']),
            ('5', &['s', 'ѕ']),
        ];
        table.into_iter().collect()
    };

    static ref KEYBOARD_ADJACENCY: HashMap<char, &'static str> = {
        let table: [(char, &'static str); 26] = [
            ('q', "wa"), ('w', "qes"), ('e', "wrd"), ('r', "etf"), ('t', "ryg"),
            ('y', "tuh"), ('u', "yij"), ('i', "uok"), ('o', "ipl"), ('p', "ol"),
            ('a', "qsz"), ('s', "wadx"), ('d', "esfc"), ('f', "rdgv"), ('g', "tfhb"),
            ('h', "ygjn"), ('j', "uhkm"), ('k', "ijl"), ('l', "okp"),
            ('z', "ax"), ('x', "zsc"), ('c', "xdv"), ('v', "cfb"), ('b', "vgn"),
            ('n', "bhm"), ('m', "nj"),
        ];
        table.into_iter().collect()
    };
}

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

const ADDITION_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

pub const COMMON_TLDS: [&str; 23] = [
    "com", "net", "org", "co", "io", "ai", "biz", "info", "edu", "gov", "uk", "de", "fr", "cn",
    "ru", "br", "in", "au", "ca", "jp", "xyz", "shop", "pro",
];

pub const COMMON_SUBDOMAINS: [&str; 20] = [
    "www", "mail", "webmail", "ftp", "admin", "portal", "secure", "login", "signin", "account",
    "shop", "store", "support", "help", "blog", "news", "api", "dev", "staging", "test",
];

/// Runs the generator for `kind`.
pub fn generate(kind: AttackKind, domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let variations = match kind {
        AttackKind::Homograph => generate_homograph(domain, cap),
        AttackKind::Bitsquat => generate_bitsquat(domain, cap),
        AttackKind::Hyphenation => generate_hyphenation(domain, cap),
        AttackKind::Omission => generate_omission(domain, cap),
        AttackKind::Repetition => generate_repetition(domain, cap),
        AttackKind::Replacement => generate_replacement(domain, cap),
        AttackKind::Subdomain => generate_subdomain(domain, cap),
        AttackKind::Transposition => generate_transposition(domain, cap),
        AttackKind::VowelSwap => generate_vowel_swap(domain, cap),
        AttackKind::Addition => generate_addition(domain, cap),
        AttackKind::Doppelganger => generate_doppelganger(domain, cap),
    };
    debug!(attack = %kind, count = variations.len(), "generated candidates");
    variations
}

/// Runs every selected generator, in [`AttackKind`] order.
pub fn generate_all(
    domain: &ParsedDomain,
    selection: &AttackSelection,
    cap: Option<usize>,
) -> CandidateSet {
    let mut set = CandidateSet::new();
    for kind in selection.kinds() {
        set.insert(kind, generate(kind, domain, cap));
    }
    set
}

pub fn generate_homograph(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(glyphs) = HOMOGLYPHS.get(ch) {
            for &glyph in glyphs.iter() {
                let mut new_name = chars.clone();
                new_name[i] = glyph;
                variations.push(domain.with_base(&collect(&new_name)));
            }
        }
    }

    // Doubled letters swapped for a doubled look-alike, e.g. "oo" -> "οο".
    for i in 0..chars.len().saturating_sub(1) {
        if chars[i] != chars[i + 1] {
            continue;
        }
        if let Some(glyphs) = HOMOGLYPHS.get(&chars[i]) {
            for &glyph in glyphs.iter().filter(|g| !g.is_ascii()) {
                let mut new_name = chars.clone();
                new_name[i] = glyph;
                new_name[i + 1] = glyph;
                variations.push(domain.with_base(&collect(&new_name)));
            }
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_bitsquat(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_ascii() {
            continue;
        }
        let code = ch as u8;
        for bit in 0..8 {
            let flipped = char::from(code ^ (1 << bit));
            if is_label_char(flipped) {
                let mut new_name = chars.clone();
                new_name[i] = flipped;
                variations.push(domain.with_base(&collect(&new_name)));
            }
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_hyphenation(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for i in 1..chars.len() {
        let mut new_name = chars.clone();
        new_name.insert(i, '-');
        variations.push(domain.with_base(&collect(&new_name)));
    }

    finish(domain, variations, cap)
}

pub fn generate_omission(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for i in 0..chars.len() {
        let mut new_name = chars.clone();
        new_name.remove(i);
        if !new_name.is_empty() {
            variations.push(domain.with_base(&collect(&new_name)));
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_repetition(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        let mut new_name = chars.clone();
        new_name.insert(i + 1, ch);
        variations.push(domain.with_base(&collect(&new_name)));
    }

    finish(domain, variations, cap)
}

pub fn generate_replacement(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(adjacent) = KEYBOARD_ADJACENCY.get(ch) {
            for key in adjacent.chars() {
                let mut new_name = chars.clone();
                new_name[i] = key;
                variations.push(domain.with_base(&collect(&new_name)));
            }
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_subdomain(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let base = domain.base_label();
    let mut variations = Vec::new();

    for token in COMMON_SUBDOMAINS {
        let mut labels = Vec::with_capacity(domain.sub_labels().len() + 1);
        labels.push(token.to_string());
        labels.extend(domain.sub_labels().iter().cloned());
        variations.push(domain.with_sub_labels(&labels, base));

        variations.push(domain.with_base(&format!("{}-{}", token, base)));
    }

    finish(domain, variations, cap)
}

pub fn generate_transposition(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for i in 0..chars.len().saturating_sub(1) {
        if chars[i] == chars[i + 1] {
            continue;
        }
        let mut new_name = chars.clone();
        new_name.swap(i, i + 1);
        variations.push(domain.with_base(&collect(&new_name)));
    }

    finish(domain, variations, cap)
}

pub fn generate_vowel_swap(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if !VOWELS.contains(ch) {
            continue;
        }
        for &vowel in VOWELS.iter().filter(|v| *v != ch) {
            let mut new_name = chars.clone();
            new_name[i] = vowel;
            variations.push(domain.with_base(&collect(&new_name)));
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_addition(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let chars: Vec<char> = domain.base_label().chars().collect();
    let mut variations = Vec::new();

    for i in 0..=chars.len() {
        for ch in ADDITION_CHARS.chars() {
            let mut new_name = chars.clone();
            new_name.insert(i, ch);
            variations.push(domain.with_base(&collect(&new_name)));
        }
    }

    finish(domain, variations, cap)
}

pub fn generate_doppelganger(domain: &ParsedDomain, cap: Option<usize>) -> Vec<String> {
    let variations = COMMON_TLDS
        .iter()
        .filter(|tld| **tld != domain.tld())
        .map(|tld| domain.with_tld(tld))
        .collect();

    finish(domain, variations, cap)
}

fn is_label_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Drops repeats and the original domain, keeping first occurrences, then applies `cap`.
fn finish(domain: &ParsedDomain, variations: Vec<String>, cap: Option<usize>) -> Vec<String> {
    let original = domain.fqdn();
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = variations
        .into_iter()
        .filter(|v| *v != original && seen.insert(v.clone()))
        .collect();

    if let Some(max) = cap {
        unique.truncate(max);
    }
    unique
}
