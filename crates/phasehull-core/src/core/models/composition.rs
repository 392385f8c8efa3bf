use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CompositionError {
    #[error("Formula is empty")]
    Empty,
    #[error("Unexpected character '{found}' at position {position} in formula '{formula}'")]
    UnexpectedCharacter {
        formula: String,
        found: char,
        position: usize,
    },
    #[error("Unbalanced parenthesis in formula '{0}'")]
    UnbalancedParenthesis(String),
    #[error("Zero count after '{symbol}' in formula '{formula}'")]
    ZeroCount { formula: String, symbol: String },
    #[error("Atom count overflow in formula '{0}'")]
    Overflow(String),
}

/// A chemical composition: element symbol mapped to a positive atom count.
///
/// Elements are kept in symbol order so that two compositions with the same counts compare,
/// hash and print identically regardless of how they were written. Zero counts are never
/// stored, so an empty map is the empty composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Composition {
    counts: BTreeMap<String, u32>,
}

impl Composition {
    /// Creates an empty composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a composition from `(symbol, count)` pairs.
    ///
    /// Repeated symbols are summed and zero counts are dropped.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut composition = Self::new();
        for (symbol, count) in counts {
            if count > 0 {
                *composition.counts.entry(symbol.into()).or_insert(0) += count;
            }
        }
        composition
    }

    /// Number of atoms of `symbol`, zero if absent.
    pub fn count(&self, symbol: &str) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(symbol, &count)| (symbol.as_str(), count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct species.
    pub fn num_species(&self) -> usize {
        self.counts.len()
    }

    pub fn total_atoms(&self) -> u64 {
        self.counts.values().map(|&count| u64::from(count)).sum()
    }

    /// Greatest common divisor of all counts, zero for the empty composition.
    pub fn gcd(&self) -> u32 {
        self.counts.values().fold(0, |acc, &count| acc.gcd(&count))
    }

    /// Returns the composition divided by the gcd of its counts.
    ///
    /// `A4B2` and `A2B` both reduce to `A2B`.
    pub fn reduced(&self) -> Self {
        let divisor = self.gcd();
        if divisor <= 1 {
            return self.clone();
        }
        Self {
            counts: self
                .counts
                .iter()
                .map(|(symbol, &count)| (symbol.clone(), count / divisor))
                .collect(),
        }
    }

    /// Largest `k` such that `k` copies of `self` are contained in `other`.
    ///
    /// The empty composition is contained in nothing and yields zero.
    pub fn largest_multiple_in(&self, other: &Composition) -> u32 {
        self.counts
            .iter()
            .map(|(symbol, &count)| other.count(symbol) / count)
            .min()
            .unwrap_or(0)
    }

    /// Removes `multiple` copies of `part` from `self`.
    ///
    /// Callers pass at most `part.largest_multiple_in(self)`; any count that would go negative
    /// is clamped to zero and removed.
    pub fn without_multiple(&self, part: &Composition, multiple: u32) -> Self {
        let mut remainder = self.clone();
        for (symbol, count) in &part.counts {
            let removed = count.saturating_mul(multiple);
            if let Some(current) = remainder.counts.get_mut(symbol) {
                *current = current.saturating_sub(removed);
                if *current == 0 {
                    remainder.counts.remove(symbol);
                }
            }
        }
        remainder
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, &count) in &self.counts {
            if count == 1 {
                write!(f, "{}", symbol)?;
            } else {
                write!(f, "{}{}", symbol, count)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Composition {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let formula = s.trim();
        if formula.is_empty() {
            return Err(CompositionError::Empty);
        }

        let mut parser = FormulaParser {
            formula,
            chars: formula.chars().collect(),
            position: 0,
        };
        let counts = parser.parse_group(0)?;

        let mut composition = Composition::new();
        for (symbol, count) in counts {
            let count =
                u32::try_from(count).map_err(|_| CompositionError::Overflow(formula.to_string()))?;
            composition.counts.insert(symbol, count);
        }
        Ok(composition)
    }
}

impl TryFrom<String> for Composition {
    type Error = CompositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Composition> for String {
    fn from(composition: Composition) -> Self {
        composition.to_string()
    }
}

struct FormulaParser<'a> {
    formula: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl FormulaParser<'_> {
    fn parse_group(&mut self, depth: usize) -> Result<BTreeMap<String, u64>, CompositionError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();

        while let Some(&c) = self.chars.get(self.position) {
            match c {
                '(' => {
                    self.position += 1;
                    let inner = self.parse_group(depth + 1)?;
                    let multiplier = self.parse_count("(...)")?;
                    for (symbol, count) in inner {
                        let scaled = count
                            .checked_mul(multiplier)
                            .ok_or_else(|| self.overflow())?;
                        self.accumulate(&mut counts, symbol, scaled)?;
                    }
                }
                ')' => {
                    if depth == 0 {
                        return Err(CompositionError::UnbalancedParenthesis(
                            self.formula.to_string(),
                        ));
                    }
                    self.position += 1;
                    return Ok(counts);
                }
                c if c.is_ascii_uppercase() => {
                    let start = self.position;
                    self.position += 1;
                    while self
                        .chars
                        .get(self.position)
                        .is_some_and(|c| c.is_ascii_lowercase())
                    {
                        self.position += 1;
                    }
                    let symbol: String = self.chars[start..self.position].iter().collect();
                    let count = self.parse_count(&symbol)?;
                    self.accumulate(&mut counts, symbol, count)?;
                }
                found => {
                    return Err(CompositionError::UnexpectedCharacter {
                        formula: self.formula.to_string(),
                        found,
                        position: self.position,
                    });
                }
            }
        }

        if depth > 0 {
            return Err(CompositionError::UnbalancedParenthesis(
                self.formula.to_string(),
            ));
        }
        Ok(counts)
    }

    fn parse_count(&mut self, symbol: &str) -> Result<u64, CompositionError> {
        let start = self.position;
        let mut value: u64 = 0;
        while let Some(digit) = self.chars.get(self.position).and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or_else(|| self.overflow())?;
            self.position += 1;
        }

        if self.position == start {
            Ok(1)
        } else if value == 0 {
            Err(CompositionError::ZeroCount {
                formula: self.formula.to_string(),
                symbol: symbol.to_string(),
            })
        } else {
            Ok(value)
        }
    }

    fn accumulate(
        &self,
        counts: &mut BTreeMap<String, u64>,
        symbol: String,
        count: u64,
    ) -> Result<(), CompositionError> {
        let slot = counts.entry(symbol).or_insert(0);
        *slot = slot.checked_add(count).ok_or_else(|| self.overflow())?;
        Ok(())
    }

    fn overflow(&self) -> CompositionError {
        CompositionError::Overflow(self.formula.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(formula: &str) -> Composition {
        formula.parse().unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_simple_formulas() {
            let oxide = parse("Fe2O3");
            assert_eq!(oxide.count("Fe"), 2);
            assert_eq!(oxide.count("O"), 3);
            assert_eq!(oxide.num_species(), 2);
            assert_eq!(oxide.total_atoms(), 5);
        }

        #[test]
        fn repeated_symbols_are_summed() {
            let acetic = parse("CH3COOH");
            assert_eq!(acetic.count("C"), 2);
            assert_eq!(acetic.count("H"), 4);
            assert_eq!(acetic.count("O"), 2);
        }

        #[test]
        fn parenthesised_groups_are_multiplied() {
            let hydroxide = parse("Ca(OH)2");
            assert_eq!(hydroxide.count("Ca"), 1);
            assert_eq!(hydroxide.count("O"), 2);
            assert_eq!(hydroxide.count("H"), 2);

            let nested = parse("K4(Fe(CN)6)");
            assert_eq!(nested.count("C"), 6);
            assert_eq!(nested.count("N"), 6);
            assert_eq!(nested.count("Fe"), 1);
            assert_eq!(nested.count("K"), 4);
        }

        #[test]
        fn surrounding_whitespace_is_ignored() {
            assert_eq!(parse("  AB2 "), parse("AB2"));
        }

        #[test]
        fn rejects_malformed_formulas() {
            assert_eq!("".parse::<Composition>(), Err(CompositionError::Empty));
            assert!(matches!(
                "ab".parse::<Composition>(),
                Err(CompositionError::UnexpectedCharacter { found: 'a', position: 0, .. })
            ));
            assert!(matches!(
                "Ca(OH2".parse::<Composition>(),
                Err(CompositionError::UnbalancedParenthesis(_))
            ));
            assert!(matches!(
                "CaOH)2".parse::<Composition>(),
                Err(CompositionError::UnbalancedParenthesis(_))
            ));
            assert!(matches!(
                "Fe0O".parse::<Composition>(),
                Err(CompositionError::ZeroCount { .. })
            ));
            assert!(matches!(
                "H99999999999".parse::<Composition>(),
                Err(CompositionError::Overflow(_))
            ));
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn reduction_divides_by_gcd() {
            assert_eq!(parse("A4B2").reduced(), parse("A2B"));
            assert_eq!(parse("A2B").reduced(), parse("A2B"));
            assert_eq!(parse("O2").reduced(), parse("O"));
            assert_eq!(parse("A6B4").gcd(), 2);
            assert_eq!(Composition::new().gcd(), 0);
        }

        #[test]
        fn largest_multiple_counts_whole_copies() {
            let part = parse("MgO");
            assert_eq!(part.largest_multiple_in(&parse("Mg2Al2O5")), 2);
            assert_eq!(part.largest_multiple_in(&parse("Al2O3")), 0);
            assert_eq!(Composition::new().largest_multiple_in(&parse("A")), 0);
        }

        #[test]
        fn without_multiple_drops_exhausted_species() {
            let spinel = parse("MgAl2O4");
            let remainder = spinel.without_multiple(&parse("MgO"), 1);
            assert_eq!(remainder, parse("Al2O3"));
            let rest = remainder.without_multiple(&parse("Al2O3"), 1);
            assert!(rest.is_empty());
        }

        #[test]
        fn from_counts_skips_zeros_and_merges() {
            let composition = Composition::from_counts([("A", 1), ("B", 0), ("A", 2)]);
            assert_eq!(composition, parse("A3"));
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn display_orders_symbols_and_omits_unit_counts() {
            assert_eq!(parse("O3Fe2").to_string(), "Fe2O3");
            assert_eq!(parse("BA").to_string(), "AB");
            assert_eq!(Composition::new().to_string(), "");
        }

        #[test]
        fn string_conversions_round_trip_through_the_formula() {
            let composition = Composition::try_from("O3Al2".to_string()).unwrap();
            assert_eq!(String::from(composition.clone()), "Al2O3");
            assert!(Composition::try_from(String::from("x")).is_err());
        }
    }
}
