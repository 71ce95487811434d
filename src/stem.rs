//! Lancaster suffix-cascade stemmer.
//!
//! Reduces a token to a canonical root by repeatedly stripping suffixes. The
//! rule table is keyed by the word's final character; each rule is a
//! `(suffix, replacement, class)` triple tried in priority order. A candidate
//! replacement is only accepted if it still looks like a word (the vowel and
//! length test in [`acceptable`]); a rejected candidate falls through to the
//! next rule rather than aborting the cascade.
//!
//! The stemmer is idempotent: `stem(stem(x)) == stem(x)`. That property is
//! what lets the stem index use stems as lookup keys — re-stemming a query
//! term always lands on the same key the index builder produced.

/// What happens after a rule's suffix matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleClass {
    /// Accept the replacement and stop.
    Stop,
    /// Like `Stop`, but the rule only applies to the intact (not yet
    /// reduced) word.
    IntactOnly,
    /// Accept the replacement and keep reducing.
    Continue,
    /// The word is protected: return it unchanged immediately.
    Protect,
}

use RuleClass::{Continue, IntactOnly, Protect, Stop};

type Rule = (&'static str, &'static str, RuleClass);

/// Rule table keyed by final character. Priority order within each set
/// matters; do not sort.
fn rules_for(last: char) -> &'static [Rule] {
    match last {
        'a' => &[("ia", "", IntactOnly), ("a", "", IntactOnly)],
        'b' => &[("bb", "b", Stop)],
        'c' => &[("ytic", "ys", Stop), ("ic", "", Continue), ("nc", "nt", Continue)],
        'd' => &[
            ("dd", "d", Stop),
            ("ied", "y", Continue),
            ("ceed", "cess", Stop),
            ("eed", "ee", Stop),
            ("ed", "", Continue),
            ("hood", "", Continue),
        ],
        'e' => &[("e", "", Continue)],
        'f' => &[("lief", "liev", Stop), ("if", "", Continue)],
        'g' => &[
            ("ing", "", Continue),
            ("iag", "y", Stop),
            ("ag", "", Continue),
            ("gg", "g", Stop),
        ],
        'h' => &[("th", "", IntactOnly), ("guish", "ct", Stop), ("ish", "", Continue)],
        'i' => &[("i", "", IntactOnly), ("i", "y", Continue)],
        'j' => &[
            ("ij", "id", Stop),
            ("fuj", "fus", Stop),
            ("uj", "ud", Stop),
            ("oj", "od", Stop),
            ("hej", "her", Stop),
            ("verj", "vert", Stop),
            ("misj", "mit", Stop),
            ("nj", "nd", Stop),
            ("j", "s", Stop),
        ],
        'l' => &[
            ("ifiabl", "", Stop),
            ("iabl", "y", Stop),
            ("abl", "", Continue),
            ("ibl", "", Stop),
            ("bil", "bl", Continue),
            ("cl", "c", Stop),
            ("iful", "y", Stop),
            ("ful", "", Continue),
            ("ul", "", Stop),
            ("ial", "", Continue),
            ("ual", "", Continue),
            ("al", "", Continue),
            ("ll", "l", Stop),
        ],
        'm' => &[("ium", "", Stop), ("um", "", IntactOnly), ("ism", "", Continue), ("mm", "m", Stop)],
        'n' => &[
            ("sion", "j", Continue),
            ("xion", "ct", Stop),
            ("ion", "", Continue),
            ("ian", "", Continue),
            ("an", "", Continue),
            ("een", "", Protect),
            ("en", "", Continue),
            ("nn", "n", Stop),
        ],
        'p' => &[("ship", "", Continue), ("pp", "p", Stop)],
        'r' => &[
            ("er", "", Continue),
            ("ear", "", Protect),
            ("ar", "", Stop),
            ("ior", "", Continue),
            ("or", "", Continue),
            ("ur", "", Continue),
            ("rr", "r", Stop),
            ("tr", "t", Continue),
            ("ier", "y", Continue),
        ],
        's' => &[
            ("ies", "y", Continue),
            ("sis", "s", Stop),
            ("is", "", Continue),
            ("ness", "", Continue),
            ("ss", "", Protect),
            ("ous", "", Continue),
            ("us", "", IntactOnly),
            ("s", "", Continue),
            ("s", "", Stop),
        ],
        't' => &[
            ("plicat", "ply", Stop),
            ("at", "", Continue),
            ("ment", "", Continue),
            ("ent", "", Continue),
            ("ant", "", Continue),
            ("ript", "rib", Stop),
            ("orpt", "orb", Stop),
            ("duct", "duc", Stop),
            ("sumpt", "sum", Stop),
            ("cept", "ceiv", Stop),
            ("olut", "olv", Stop),
            ("sist", "", Protect),
            ("ist", "", Continue),
            ("tt", "t", Stop),
        ],
        'u' => &[("iqu", "", Stop), ("ogu", "og", Stop)],
        'v' => &[("siv", "j", Continue), ("eiv", "", Protect), ("iv", "", Continue)],
        'y' => &[
            ("bly", "bl", Continue),
            ("ily", "y", Continue),
            ("ply", "", Protect),
            ("ly", "", Continue),
            ("ogy", "og", Stop),
            ("phy", "ph", Stop),
            ("omy", "om", Stop),
            ("opy", "op", Stop),
            ("ity", "", Continue),
            ("ety", "", Continue),
            ("lty", "l", Stop),
            ("istry", "", Stop),
            ("ary", "", Continue),
            ("ory", "", Continue),
            ("ify", "", Stop),
            ("ncy", "nt", Continue),
            ("acy", "", Continue),
        ],
        'z' => &[("iz", "", Continue), ("yz", "ys", Stop)],
        _ => &[],
    }
}

#[inline]
fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// A candidate is acceptable when it still contains a vowel and is long
/// enough: more than one character if it starts with a vowel, more than two
/// otherwise.
fn acceptable(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if is_vowel(first) {
        value.chars().count() > 1
    } else {
        value.chars().count() > 2 && value.chars().any(is_vowel)
    }
}

fn apply_rules(value: String, intact: bool) -> String {
    let Some(last) = value.chars().last() else {
        return value;
    };

    for &(suffix, replacement, class) in rules_for(last) {
        if !intact && class == IntactOnly {
            continue;
        }
        if !value.ends_with(suffix) {
            continue;
        }
        if class == Protect {
            return value;
        }

        let breakpoint = value.len() - suffix.len();
        let mut candidate = String::with_capacity(breakpoint + replacement.len());
        candidate.push_str(&value[..breakpoint]);
        candidate.push_str(replacement);

        if !acceptable(&candidate) {
            continue;
        }
        if class == Continue {
            return apply_rules(candidate, false);
        }
        return candidate;
    }

    value
}

/// Reduce a word to its stem. Lowercases first, so surface forms that differ
/// only by case share a stem.
pub fn stem(word: &str) -> String {
    apply_rules(word.to_lowercase(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_reductions() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("jumped"), "jump");
        assert_eq!(stem("maximum"), "maxim");
        assert_eq!(stem("factionally"), "fact");
        assert_eq!(stem("quick"), "quick");
    }

    #[test]
    fn lowercases_before_stemming() {
        assert_eq!(stem("Running"), stem("running"));
        assert_eq!(stem("THE"), "the");
    }

    #[test]
    fn protect_rules_abort() {
        assert_eq!(stem("year"), "year");
        assert_eq!(stem("seen"), "seen");
        assert_eq!(stem("glass"), "glass");
    }

    #[test]
    fn intact_rules_skip_reduced_words() {
        // "datum" hits the intact-only "um" rule on the original word...
        assert_eq!(stem("datum"), "dat");
        // ...but "maximums" reaches "maximum" already reduced, so the "um"
        // rule no longer applies.
        assert_eq!(stem("maximums"), "maximum");
    }

    #[test]
    fn rejected_candidates_fall_through() {
        // Every rule for "bus" produces a vowelless or too-short candidate,
        // so the word survives untouched.
        assert_eq!(stem("bus"), "bus");
        // "is" from "this" would leave "th" (no vowel); the cascade falls
        // through to the plain "s" rule and keeps reducing.
        assert_eq!(stem("this"), "thy");
    }

    #[test]
    fn idempotent_on_samples() {
        for word in ["running", "believes", "nationally", "textbox", "does"] {
            let once = stem(word);
            assert_eq!(stem(&once), once, "stem not idempotent for {word}");
        }
    }
}
