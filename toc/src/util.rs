//! Module dedicated to ordering helpers.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Find the index at which `item` should be inserted into the
/// ascending `items` slice.
///
/// The returned index is located after every element comparing equal
/// to `item`, so that successive insertions of equal elements keep
/// their insertion order.
pub fn bsearch_for_insert<T, F>(items: &[T], item: &T, cmp: F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    items.partition_point(|candidate| cmp(candidate, item) != Ordering::Greater)
}

/// Compare two strings the way a user expects to see them listed.
///
/// Strings are compared on three levels, each one only breaking the
/// ties of the previous one:
///
/// - base letters, ignoring case and accents (`é` sorts with `e`,
///   `Ø` with `o`)
/// - accents, an unaccented letter coming first
/// - case, the lowercase variant coming first
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| lowercase(a).cmp(lowercase(b)))
        .then_with(|| b.cmp(a))
}

fn lowercase(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    lowercase(s)
        .filter(|c| !is_combining_mark(*c))
        .flat_map(fold_letter)
}

// Letters without canonical decomposition, folded to their Latin base.
fn fold_letter(c: char) -> Folded {
    match c {
        'ø' => Folded::One('o'),
        'ł' => Folded::One('l'),
        'đ' | 'ð' => Folded::One('d'),
        'ħ' => Folded::One('h'),
        'ı' => Folded::One('i'),
        'æ' => Folded::Two('a', 'e'),
        'œ' => Folded::Two('o', 'e'),
        'ß' => Folded::Two('s', 's'),
        c => Folded::One(c),
    }
}

enum Folded {
    One(char),
    Two(char, char),
    Done,
}

impl Iterator for Folded {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match *self {
            Self::One(c) => {
                *self = Self::Done;
                Some(c)
            }
            Self::Two(c, next) => {
                *self = Self::One(next);
                Some(c)
            }
            Self::Done => None,
        }
    }
}
