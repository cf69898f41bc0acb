//! Natural ordering of strings.
//!
//! Runs of ASCII digits are compared by their numeric value, so `item2` goes
//! before `item10`. Everything else is compared character by character.

use std::cmp::Ordering;

/// Compares the provided strings in natural order.
///
/// Digit runs of equal numeric value are tie-broken by their length, so that
/// `a1` goes before `a01`.
#[must_use]
pub fn cmp(lhs: &str, rhs: &str) -> Ordering {
    let (mut lhs, mut rhs) = (lhs, rhs);
    loop {
        let (Some(l), Some(r)) = (lhs.chars().next(), rhs.chars().next())
        else {
            return lhs.len().cmp(&rhs.len());
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let (l_num, l_rest) = split_digits(lhs);
            let (r_num, r_rest) = split_digits(rhs);
            match cmp_numbers(l_num, r_num) {
                Ordering::Equal => {
                    lhs = l_rest;
                    rhs = r_rest;
                }
                ord @ (Ordering::Less | Ordering::Greater) => return ord,
            }
        } else {
            match l.cmp(&r) {
                Ordering::Equal => {
                    lhs = &lhs[l.len_utf8()..];
                    rhs = &rhs[r.len_utf8()..];
                }
                ord @ (Ordering::Less | Ordering::Greater) => return ord,
            }
        }
    }
}

/// Splits the leading run of ASCII digits off the provided string.
fn split_digits(s: &str) -> (&str, &str) {
    s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()))
}

/// Compares two runs of ASCII digits by their numeric value.
fn cmp_numbers(lhs: &str, rhs: &str) -> Ordering {
    let l = lhs.trim_start_matches('0');
    let r = rhs.trim_start_matches('0');
    l.len()
        .cmp(&r.len())
        .then_with(|| l.cmp(r))
        .then_with(|| lhs.len().cmp(&rhs.len()))
}

#[cfg(test)]
mod spec {
    use std::cmp::Ordering;

    use super::cmp;

    #[test]
    fn compares_numbers_by_value() {
        assert_eq!(cmp("item2", "item10"), Ordering::Less);
        assert_eq!(cmp("item10", "item2"), Ordering::Greater);
        assert_eq!(cmp("brazil0", "brazil1"), Ordering::Less);
        assert_eq!(cmp("ecuador248", "ecuador248"), Ordering::Equal);
        assert_eq!(cmp("a2b10", "a2b9"), Ordering::Greater);
        assert_eq!(
            cmp("x99999999999999999999999", "x100000000000000000000000"),
            Ordering::Less,
        );
    }

    #[test]
    fn tie_breaks_leading_zeros() {
        assert_eq!(cmp("a1", "a01"), Ordering::Less);
        assert_eq!(cmp("a007", "a7"), Ordering::Greater);
        assert_eq!(cmp("a007", "a8"), Ordering::Less);
    }

    #[test]
    fn compares_text_lexically() {
        assert_eq!(cmp("michel", "pierre"), Ordering::Less);
        assert_eq!(cmp("remi", "pierre"), Ordering::Greater);
        assert_eq!(cmp("spec", "specialchar1"), Ordering::Less);
        assert_eq!(cmp("", ""), Ordering::Equal);
        assert_eq!(cmp("", "a"), Ordering::Less);
        assert_eq!(cmp("Zed", "alpha"), Ordering::Less);
        assert_eq!(cmp("élan", "zèbre"), Ordering::Greater);
    }

    #[test]
    fn sorts_naturally() {
        let mut values = vec![
            "specialchar2",
            "item10",
            "brazil1",
            "item2",
            "brazil0",
            "item1",
        ];
        values.sort_by(|a, b| cmp(a, b));

        assert_eq!(
            values,
            [
                "brazil0",
                "brazil1",
                "item1",
                "item2",
                "item10",
                "specialchar2",
            ],
        );
    }
}
