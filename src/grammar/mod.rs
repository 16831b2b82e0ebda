//! Grammar engine: L-system string rewriting with optional stochastic rules.
//!
//! A [`RuleSet`] maps single symbols to an [`Expansion`]. Each generation
//! replaces every symbol of the current string with its expansion; symbols
//! without a rule are copied through unchanged.

use std::collections::BTreeMap;

use log::{debug, warn};
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::spec::{SpecError, MAX_SYMBOLS};

/// Tolerance when checking that weighted probabilities sum to 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One weighted alternative of a stochastic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub replacement: String,
    pub probability: f64,
}

/// Alternatives of a stochastic rule whose probabilities sum to 1.
///
/// Only built through [`Expansion::weighted`] or [`Expansion::uniform`], so the
/// list is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted {
    alternatives: Vec<Alternative>,
}

impl Weighted {
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }
}

/// What a symbol rewrites to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpansionRepr", into = "ExpansionRepr")]
pub enum Expansion {
    /// Always the same replacement.
    Literal(String),
    /// One alternative drawn per occurrence by cumulative probability.
    Weighted(Weighted),
}

/// Wire shapes accepted for an expansion: a string, a list of weighted
/// alternatives, or a list of equally likely strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ExpansionRepr {
    Literal(String),
    Weighted(Vec<Alternative>),
    Uniform(Vec<String>),
}

/// Placeholder symbol for rule errors raised before the symbol is known.
const UNNAMED: &str = "?";

impl Expansion {
    pub fn literal(replacement: impl Into<String>) -> Self {
        Self::Literal(replacement.into())
    }

    /// Build a weighted expansion, checking that probabilities form a distribution.
    pub fn weighted(alternatives: Vec<Alternative>) -> Result<Self, SpecError> {
        if alternatives.is_empty() {
            return Err(SpecError::rule(UNNAMED, "weighted rule has no alternatives"));
        }
        let mut total = 0.0;
        for alt in &alternatives {
            if !alt.probability.is_finite() || !(0.0..=1.0).contains(&alt.probability) {
                return Err(SpecError::rule(
                    UNNAMED,
                    format!(
                        "probability {} of '{}' outside [0, 1]",
                        alt.probability, alt.replacement
                    ),
                ));
            }
            total += alt.probability;
        }
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(SpecError::rule(
                UNNAMED,
                format!("probabilities sum to {total}, expected 1"),
            ));
        }
        Ok(Self::Weighted(Weighted { alternatives }))
    }

    /// Equally likely alternatives.
    pub fn uniform<S: Into<String>>(choices: Vec<S>) -> Result<Self, SpecError> {
        let n = choices.len();
        if n == 0 {
            return Err(SpecError::rule(UNNAMED, "uniform rule has no alternatives"));
        }
        let mut alternatives: Vec<Alternative> = choices
            .into_iter()
            .map(|c| Alternative {
                replacement: c.into(),
                probability: 1.0 / n as f64,
            })
            .collect();
        // Absorb rounding so the sum is exactly representable as 1.
        let rest: f64 = alternatives[1..].iter().map(|a| a.probability).sum();
        alternatives[0].probability = 1.0 - rest;
        Ok(Self::Weighted(Weighted { alternatives }))
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self, Self::Weighted(_))
    }

    /// Longest replacement this expansion can produce, in symbols.
    pub fn max_len(&self) -> usize {
        match self {
            Self::Literal(s) => s.chars().count(),
            Self::Weighted(w) => w
                .alternatives
                .iter()
                .map(|a| a.replacement.chars().count())
                .max()
                .unwrap_or(0),
        }
    }

    /// Pick the replacement for one occurrence.
    ///
    /// Weighted rules draw a single uniform value in `[0, 1)` and take the first
    /// alternative whose cumulative probability exceeds it. If rounding leaves
    /// no match, the last alternative is used.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Weighted(w) => {
                let draw: f64 = rng.gen();
                let mut cumulative = 0.0;
                for alt in &w.alternatives {
                    cumulative += alt.probability;
                    if cumulative > draw {
                        return &alt.replacement;
                    }
                }
                w.alternatives.last().map_or("", |a| a.replacement.as_str())
            }
        }
    }
}

impl TryFrom<ExpansionRepr> for Expansion {
    type Error = SpecError;

    fn try_from(repr: ExpansionRepr) -> Result<Self, Self::Error> {
        match repr {
            ExpansionRepr::Literal(s) => Ok(Self::Literal(s)),
            ExpansionRepr::Weighted(alts) => Self::weighted(alts),
            ExpansionRepr::Uniform(choices) => Self::uniform(choices),
        }
    }
}

impl From<Expansion> for ExpansionRepr {
    fn from(e: Expansion) -> Self {
        match e {
            Expansion::Literal(s) => Self::Literal(s),
            Expansion::Weighted(w) => Self::Weighted(w.alternatives),
        }
    }
}

/// Attach `symbol` to a rule error raised while building its expansion.
fn name_rule(err: SpecError, symbol: &str) -> SpecError {
    match err {
        SpecError::InvalidRule { reason, .. } => SpecError::rule(symbol, reason),
        other => other,
    }
}

/// Production rules keyed by single symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "BTreeMap<String, Expansion>")]
pub struct RuleSet {
    rules: BTreeMap<char, Expansion>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `symbol`.
    pub fn insert(&mut self, symbol: char, expansion: Expansion) -> &mut Self {
        self.rules.insert(symbol, expansion);
        self
    }

    /// Convenience for deterministic rule sets: `[('F', "F+F-F")]`.
    pub fn literal<'a>(pairs: impl IntoIterator<Item = (char, &'a str)>) -> Self {
        let mut set = Self::new();
        for (symbol, replacement) in pairs {
            set.insert(symbol, Expansion::literal(replacement));
        }
        set
    }

    pub fn get(&self, symbol: char) -> Option<&Expansion> {
        self.rules.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_stochastic(&self) -> bool {
        self.rules.values().any(Expansion::is_stochastic)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Expansion)> {
        self.rules.iter().map(|(c, e)| (*c, e))
    }

    /// Parse `SYMBOL=REPLACEMENT`, where `A|B|C` in the replacement means
    /// equally likely alternatives.
    pub fn parse_rule(text: &str) -> Result<(char, Expansion), SpecError> {
        let (key, replacement) = text
            .split_once('=')
            .ok_or_else(|| SpecError::rule(text, "expected SYMBOL=REPLACEMENT"))?;
        let mut chars = key.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(symbol), None) => symbol,
            _ => return Err(SpecError::rule(key, "rule keys must be exactly one symbol")),
        };
        let expansion = if replacement.contains('|') {
            Expansion::uniform(replacement.split('|').collect::<Vec<_>>())
                .map_err(|e| name_rule(e, key))?
        } else {
            Expansion::literal(replacement)
        };
        Ok((symbol, expansion))
    }

    /// Upper bound on the length of `symbols` after one generation.
    fn next_len_bound(&self, symbols: &str) -> usize {
        symbols
            .chars()
            .map(|c| self.rules.get(&c).map_or(1, Expansion::max_len))
            .fold(0usize, usize::saturating_add)
    }
}

impl RuleSet {
    fn from_wire(map: BTreeMap<String, ExpansionRepr>) -> Result<Self, SpecError> {
        let mut rules = BTreeMap::new();
        for (key, repr) in map {
            let mut chars = key.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(symbol), None) => symbol,
                _ => return Err(SpecError::rule(key, "rule keys must be exactly one symbol")),
            };
            let expansion = Expansion::try_from(repr).map_err(|e| name_rule(e, &key))?;
            rules.insert(symbol, expansion);
        }
        Ok(Self { rules })
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, ExpansionRepr>::deserialize(deserializer)?;
        Self::from_wire(map).map_err(de::Error::custom)
    }
}

impl From<RuleSet> for BTreeMap<String, Expansion> {
    fn from(set: RuleSet) -> Self {
        set.rules
            .into_iter()
            .map(|(c, e)| (c.to_string(), e))
            .collect()
    }
}

/// Result of a bounded expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub symbols: String,
    /// Generations actually applied; lower than requested when the symbol
    /// budget would have been exceeded.
    pub generations: u32,
}

/// Rewrite `axiom` for `depth` generations.
///
/// Output is capped at [`MAX_SYMBOLS`]; see [`expand_within`].
pub fn expand<R: Rng + ?Sized>(axiom: &str, rules: &RuleSet, depth: u32, rng: &mut R) -> String {
    expand_within(axiom, rules, depth, MAX_SYMBOLS, rng).symbols
}

/// Rewrite `axiom` for up to `depth` generations, stopping before any
/// generation whose worst-case length exceeds `max_symbols`.
pub fn expand_within<R: Rng + ?Sized>(
    axiom: &str,
    rules: &RuleSet,
    depth: u32,
    max_symbols: usize,
    rng: &mut R,
) -> Expanded {
    let mut current = axiom.to_string();
    let mut generations = 0;

    for _ in 0..depth {
        let bound = rules.next_len_bound(&current);
        if bound > max_symbols {
            warn!(
                "l-system expansion stopped after {generations} of {depth} generations \
                 ({bound} symbols would exceed the {max_symbols} symbol budget)"
            );
            break;
        }
        let mut next = String::with_capacity(bound);
        for c in current.chars() {
            match rules.get(c) {
                Some(expansion) => next.push_str(expansion.choose(rng)),
                None => next.push(c),
            }
        }
        current = next;
        generations += 1;
    }

    debug!(
        "expanded '{axiom}' to {} symbols in {generations} generations",
        current.chars().count()
    );
    Expanded {
        symbols: current,
        generations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn depth_zero_returns_axiom() {
        let rules = RuleSet::literal([('F', "F+F")]);
        assert_eq!(expand("F-F", &rules, 0, &mut rng()), "F-F");
    }

    #[test]
    fn empty_axiom_stays_empty() {
        let rules = RuleSet::literal([('F', "F+F")]);
        assert_eq!(expand("", &rules, 5, &mut rng()), "");
    }

    #[test]
    fn two_generations_of_simple_rule() {
        let rules = RuleSet::literal([('F', "F+F-F")]);
        assert_eq!(expand("F", &rules, 1, &mut rng()), "F+F-F");
        assert_eq!(expand("F", &rules, 2, &mut rng()), "F+F-F+F+F-F-F+F-F");
    }

    #[test]
    fn unknown_symbols_pass_through() {
        let rules = RuleSet::literal([('X', "X+YF+"), ('Y', "-FX-Y")]);
        assert_eq!(expand("FX", &rules, 1, &mut rng()), "FX+YF+");
        assert_eq!(expand("FX", &rules, 2, &mut rng()), "FX+YF++-FX-YF+");
    }

    #[test]
    fn koch_growth_is_four_to_the_depth_in_forward_moves() {
        let rules = RuleSet::literal([('F', "F+F--F+F")]);
        for depth in 0..6 {
            let s = expand("F", &rules, depth, &mut rng());
            let forwards = s.chars().filter(|&c| c == 'F').count();
            assert_eq!(forwards, 4usize.pow(depth));
            // Every F contributes 7 extra symbols per generation.
            let expected_len = 1 + 7 * (4usize.pow(depth) - 1) / 3;
            assert_eq!(s.len(), expected_len);
        }
    }

    #[test]
    fn pure_forward_rule_grows_geometrically() {
        let rules = RuleSet::literal([('F', "FFFF")]);
        for depth in 0..6 {
            let s = expand("F", &rules, depth, &mut rng());
            assert_eq!(s.len(), 4usize.pow(depth));
        }
    }

    #[test]
    fn budget_stops_expansion_early() {
        let rules = RuleSet::literal([('F', "FF")]);
        let out = expand_within("F", &rules, 10, 64, &mut rng());
        assert_eq!(out.generations, 6);
        assert_eq!(out.symbols.len(), 64);
    }

    #[test]
    fn weighted_rule_selects_only_listed_alternatives() {
        let mut rules = RuleSet::new();
        rules.insert(
            'A',
            Expansion::weighted(vec![
                Alternative {
                    replacement: "x".into(),
                    probability: 0.25,
                },
                Alternative {
                    replacement: "y".into(),
                    probability: 0.75,
                },
            ])
            .unwrap(),
        );
        let s = expand("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", &rules, 1, &mut rng());
        assert!(s.chars().all(|c| c == 'x' || c == 'y'));
        assert!(s.contains('y'));
    }

    #[test]
    fn weighted_selection_is_reproducible_with_same_seed() {
        let mut rules = RuleSet::new();
        rules.insert('A', Expansion::uniform(vec!["AB", "BA"]).unwrap());
        rules.insert('B', Expansion::uniform(vec!["A", "B"]).unwrap());
        let a = expand("A", &rules, 6, &mut ChaCha8Rng::seed_from_u64(99));
        let b = expand("A", &rules, 6, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn weighted_frequencies_follow_probabilities() {
        let exp = Expansion::weighted(vec![
            Alternative {
                replacement: "a".into(),
                probability: 0.2,
            },
            Alternative {
                replacement: "b".into(),
                probability: 0.8,
            },
        ])
        .unwrap();
        let mut r = rng();
        let n = 20_000;
        let hits = (0..n).filter(|_| exp.choose(&mut r) == "a").count();
        let ratio = hits as f64 / n as f64;
        assert!((ratio - 0.2).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn weighted_rejects_bad_sum() {
        let err = Expansion::weighted(vec![Alternative {
            replacement: "a".into(),
            probability: 0.5,
        }]);
        assert!(err.is_err());
    }

    #[test]
    fn weighted_rejects_empty_and_negative() {
        assert!(Expansion::weighted(vec![]).is_err());
        let err = Expansion::weighted(vec![
            Alternative {
                replacement: "a".into(),
                probability: -0.5,
            },
            Alternative {
                replacement: "b".into(),
                probability: 1.5,
            },
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn parse_rule_text() {
        let (symbol, exp) = RuleSet::parse_rule("F=F+F-F").unwrap();
        assert_eq!(symbol, 'F');
        assert_eq!(exp, Expansion::literal("F+F-F"));

        let (_, exp) = RuleSet::parse_rule("X=XF|FX").unwrap();
        assert!(exp.is_stochastic());

        // An empty replacement erases the symbol.
        let (_, exp) = RuleSet::parse_rule("Y=").unwrap();
        assert_eq!(exp, Expansion::literal(""));

        assert!(RuleSet::parse_rule("FF=F").is_err());
        assert!(RuleSet::parse_rule("F").is_err());
    }

    #[test]
    fn uniform_probabilities_sum_to_one() {
        let exp = Expansion::uniform(vec!["a", "b", "c"]).unwrap();
        if let Expansion::Weighted(w) = exp {
            let total: f64 = w.alternatives().iter().map(|a| a.probability).sum();
            assert!((total - 1.0).abs() < 1e-12);
        } else {
            panic!("expected weighted expansion");
        }
    }

    #[test]
    fn rules_parse_from_json_shapes() {
        let json = r#"{
            "F": "F+F",
            "A": [{"replacement": "AB", "probability": 0.5},
                  {"replacement": "BA", "probability": 0.5}],
            "B": ["A", "B"]
        }"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get('F'), Some(&Expansion::literal("F+F")));
        assert!(rules.get('A').unwrap().is_stochastic());
        assert!(rules.get('B').unwrap().is_stochastic());
    }

    #[test]
    fn multi_symbol_rule_key_is_rejected() {
        let json = r#"{"FF": "F"}"#;
        let err = serde_json::from_str::<RuleSet>(json).unwrap_err();
        assert!(err.to_string().contains("exactly one symbol"));
    }

    #[test]
    fn bad_probabilities_rejected_when_parsing() {
        let json = r#"{"A": [{"replacement": "AB", "probability": 0.9},
                             {"replacement": "BA", "probability": 0.9}]}"#;
        assert!(serde_json::from_str::<RuleSet>(json).is_err());
    }

    #[test]
    fn rule_errors_name_their_symbol() {
        let json = r#"{"A": [{"replacement": "AB", "probability": 0.3}]}"#;
        let err = serde_json::from_str::<RuleSet>(json).unwrap_err();
        assert!(err.to_string().contains("invalid rule 'A'"), "{err}");

        let json = r#"{"B": []}"#;
        let err = serde_json::from_str::<RuleSet>(json).unwrap_err();
        assert!(err.to_string().contains("invalid rule 'B'"), "{err}");
    }

    #[test]
    fn weighted_rules_must_be_a_distribution() {
        assert!(Expansion::weighted(vec![]).is_err());
        let short = vec![Alternative {
            replacement: "AB".into(),
            probability: 0.3,
        }];
        assert!(matches!(
            Expansion::weighted(short),
            Err(SpecError::InvalidRule { .. })
        ));
    }

    #[test]
    fn weighted_choice_only_yields_its_alternatives() {
        let exp = Expansion::weighted(vec![
            Alternative {
                replacement: "X".into(),
                probability: 0.25,
            },
            Alternative {
                replacement: "Y".into(),
                probability: 0.75,
            },
        ])
        .unwrap();
        let mut rng = rng();
        let mut ys = 0;
        for _ in 0..4000 {
            match exp.choose(&mut rng) {
                "X" => {}
                "Y" => ys += 1,
                other => panic!("unexpected replacement {other}"),
            }
        }
        assert!((ys as f64 / 4000.0 - 0.75).abs() < 0.03);
    }

    #[test]
    fn rules_json_round_trip() {
        let mut rules = RuleSet::literal([('X', "X+YF+"), ('Y', "-FX-Y")]);
        rules.insert('A', Expansion::uniform(vec!["AB", "BA"]).unwrap());
        let json = serde_json::to_string(&rules).unwrap();
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(rules, back);
    }
}
