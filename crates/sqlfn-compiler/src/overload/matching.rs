//! Per-candidate argument matching.
//!
//! Each candidate signature is compared against the actual arguments one
//! fixed parameter at a time, producing a [`MatchLevel`] and a type-distance
//! score. Variadic tail arguments are not scored.

use sqlfn_core::{Args, EmptyRecord, Function, FunctionTraits, TypeTag};
use sqlfn_registry::{ArgSpec, SignatureDescriptor};

use crate::conversion::{OVERLOAD_NONE, overload_distance};

/// Score bonus for a window function resolved inside a window clause.
pub const WINDOW_BONUS: i64 = 20;

/// How well a candidate fits the arguments, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchLevel {
    NoMatch = 0,
    /// At least one argument needs a coercion and none matched exactly.
    Fuzzy = 1,
    /// A mix of exact matches and coercions.
    Partial = 2,
    /// Every argument matches its parameter's type.
    Exact = 3,
}

impl MatchLevel {
    /// Fold in an argument that matched exactly.
    #[inline]
    pub fn merge_exact(self) -> Self {
        match self {
            MatchLevel::NoMatch => MatchLevel::Exact,
            MatchLevel::Fuzzy => MatchLevel::Partial,
            other => other,
        }
    }

    /// Fold in an argument that needs a coercion. A `NULL` argument as the
    /// first coerced one starts at partial rather than fuzzy.
    #[inline]
    pub fn merge_coerced(self, null_arg: bool) -> Self {
        match self {
            MatchLevel::NoMatch if null_arg => MatchLevel::Partial,
            MatchLevel::NoMatch => MatchLevel::Fuzzy,
            MatchLevel::Exact => MatchLevel::Partial,
            other => other,
        }
    }
}

/// Outcome of matching one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateScore {
    pub level: MatchLevel,
    /// Summed coercion distance; lower is better.
    pub score: i64,
}

impl CandidateScore {
    pub const NO_MATCH: CandidateScore = CandidateScore {
        level: MatchLevel::NoMatch,
        score: 0,
    };
}

/// Match `args` against one candidate whose arity already fits.
///
/// `is_cast` disables coercion of the second argument, which names the
/// cast target and must match exactly.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn score_candidate(
    descriptor: &SignatureDescriptor,
    args: &Args,
    is_cast: bool,
    window_ctx: bool,
) -> CandidateScore {
    let fixed = descriptor.fixed_arg_count();
    let mut level = if fixed == 0 {
        MatchLevel::Exact
    } else {
        MatchLevel::NoMatch
    };
    let mut score = 0i64;

    for (index, spec) in descriptor.args().iter().enumerate() {
        let Some(arg) = args.get(index) else {
            return CandidateScore::NO_MATCH;
        };
        match match_argument(descriptor, spec, arg, index, is_cast) {
            ArgMatch::Exact => level = level.merge_exact(),
            ArgMatch::Coerced { distance, null_arg } => {
                score += distance;
                level = level.merge_coerced(null_arg);
            }
            ArgMatch::None => return CandidateScore::NO_MATCH,
        }
    }

    if window_ctx != descriptor.is_window() {
        level = MatchLevel::Fuzzy;
    } else if descriptor.is_window() {
        score -= WINDOW_BONUS;
    }

    CandidateScore { level, score }
}

enum ArgMatch {
    Exact,
    Coerced { distance: i64, null_arg: bool },
    None,
}

fn match_argument(
    descriptor: &SignatureDescriptor,
    spec: &ArgSpec,
    arg: &dyn Function,
    index: usize,
    is_cast: bool,
) -> ArgMatch {
    if spec.is_constant() && !arg.is_constant() {
        return ArgMatch::None;
    }

    let arg_type = arg.column_type();
    let arg_tag = arg_type.tag();
    let sig_tag = spec.tag();

    let arg_is_array = arg_tag == TypeTag::Array;
    let arg_is_string_array = arg_tag == TypeTag::ArrayString;
    if spec.is_array() != arg_is_array || (sig_tag == TypeTag::ArrayString) != arg_is_string_array
    {
        return ArgMatch::None;
    }
    if arg_is_string_array {
        return ArgMatch::Exact;
    }
    if arg_is_array {
        return if arg_type.element_tag() == sig_tag {
            ArgMatch::Exact
        } else {
            ArgMatch::None
        };
    }

    let char_as_string = arg_tag == TypeTag::Char
        && sig_tag == TypeTag::String
        && descriptor.supports_implicit_char_to_str()
        && arg.is_constant()
        && !arg.traits().contains(FunctionTraits::TYPE_CONSTANT);
    if sig_tag == arg_tag || char_as_string || (sig_tag == TypeTag::GeoHash && arg_tag.is_geohash())
    {
        return ArgMatch::Exact;
    }

    // The cast target must be taken as written.
    if index == 1 && is_cast {
        return ArgMatch::None;
    }

    let mut distance = overload_distance(arg_tag, sig_tag);
    if arg_tag == TypeTag::String && sig_tag == TypeTag::Char {
        if arg.is_constant() {
            let value = arg.eval(&EmptyRecord);
            if value.as_str().is_some_and(|s| s.chars().count() > 1) {
                distance = OVERLOAD_NONE;
            }
        } else {
            distance *= 2;
        }
    } else if arg_tag == TypeTag::Char
        && sig_tag == TypeTag::String
        && !descriptor.supports_implicit_char_to_str()
    {
        distance = OVERLOAD_NONE;
    }

    if distance != OVERLOAD_NONE || arg.is_undefined() {
        ArgMatch::Coerced {
            distance: i64::from(distance),
            null_arg: arg_tag == TypeTag::Null,
        }
    } else {
        ArgMatch::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sqlfn_core::{
        BoxedFunction, ColumnType, Constant, ExecutionContext, Record, ResolveError,
        ResolverConfig, Span, Value,
    };
    use sqlfn_registry::FunctionFactory;

    struct Sig {
        signature: &'static str,
        window: bool,
        char_to_str: bool,
    }

    impl FunctionFactory for Sig {
        fn signature(&self) -> &str {
            self.signature
        }

        fn is_window(&self) -> bool {
            self.window
        }

        fn supports_implicit_char_to_str(&self) -> bool {
            self.char_to_str
        }

        fn new_instance(
            &self,
            _position: Span,
            _args: Args,
            _config: &ResolverConfig,
            _ctx: &dyn ExecutionContext,
        ) -> Result<Option<BoxedFunction>, ResolveError> {
            Ok(None)
        }
    }

    fn descriptor(signature: &'static str) -> SignatureDescriptor {
        SignatureDescriptor::new(Arc::new(Sig {
            signature,
            window: false,
            char_to_str: true,
        }))
        .unwrap()
    }

    #[derive(Debug)]
    struct Column(ColumnType);

    impl Function for Column {
        fn name(&self) -> &str {
            "column"
        }

        fn column_type(&self) -> ColumnType {
            self.0
        }

        fn eval(&self, _record: &dyn Record) -> Value {
            Value::Null
        }
    }

    fn args(functions: Vec<BoxedFunction>) -> Args {
        functions
            .into_iter()
            .enumerate()
            .map(|(i, f)| (f, Span::point(i as u32)))
            .collect()
    }

    fn score(signature: &'static str, functions: Vec<BoxedFunction>) -> CandidateScore {
        score_candidate(&descriptor(signature), &args(functions), false, false)
    }

    #[test]
    fn level_merging() {
        assert_eq!(MatchLevel::NoMatch.merge_exact(), MatchLevel::Exact);
        assert_eq!(MatchLevel::Fuzzy.merge_exact(), MatchLevel::Partial);
        assert_eq!(MatchLevel::Exact.merge_coerced(false), MatchLevel::Partial);
        assert_eq!(MatchLevel::NoMatch.merge_coerced(false), MatchLevel::Fuzzy);
        assert_eq!(MatchLevel::NoMatch.merge_coerced(true), MatchLevel::Partial);
        assert!(MatchLevel::Exact > MatchLevel::Partial);
    }

    #[test]
    fn exact_types_score_zero() {
        let result = score("f(int, string)", vec![
            Box::new(Constant::int(1)),
            Box::new(Constant::str("ab")),
        ]);
        assert_eq!(result, CandidateScore {
            level: MatchLevel::Exact,
            score: 0
        });
    }

    #[test]
    fn widening_is_fuzzy_or_partial() {
        let fuzzy = score("f(long)", vec![Box::new(Constant::int(1))]);
        assert_eq!(fuzzy.level, MatchLevel::Fuzzy);
        assert_eq!(fuzzy.score, 1);

        let partial = score("f(long, int)", vec![
            Box::new(Constant::int(1)),
            Box::new(Constant::int(1)),
        ]);
        assert_eq!(partial.level, MatchLevel::Partial);
    }

    #[test]
    fn null_argument_is_partial() {
        let result = score("f(int)", vec![Box::new(Constant::untyped_null())]);
        assert_eq!(result.level, MatchLevel::Partial);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn constant_slot_rejects_columns() {
        let result = score("f(int const)", vec![Box::new(Column(ColumnType::INT))]);
        assert_eq!(result.level, MatchLevel::NoMatch);
    }

    #[test]
    fn arrays_must_match_element_type() {
        let doubles = ColumnType::array(TypeTag::Double, 1);
        assert_eq!(
            score("f(double[])", vec![Box::new(Column(doubles))]).level,
            MatchLevel::Exact
        );
        assert_eq!(
            score("f(long[])", vec![Box::new(Column(doubles))]).level,
            MatchLevel::NoMatch
        );
        assert_eq!(
            score("f(double)", vec![Box::new(Column(doubles))]).level,
            MatchLevel::NoMatch
        );
    }

    #[test]
    fn char_constant_matches_string_exactly() {
        let result = score("f(string)", vec![Box::new(Constant::char('a'))]);
        assert_eq!(result.level, MatchLevel::Exact);

        let strict = SignatureDescriptor::new(Arc::new(Sig {
            signature: "f(string)",
            window: false,
            char_to_str: false,
        }))
        .unwrap();
        let result = score_candidate(&strict, &args(vec![Box::new(Constant::char('a'))]), false, false);
        assert_eq!(result.level, MatchLevel::NoMatch);
    }

    #[test]
    fn long_string_constant_never_becomes_char() {
        assert_eq!(
            score("f(char)", vec![Box::new(Constant::str("ab"))]).level,
            MatchLevel::NoMatch
        );
        let column = score("f(char)", vec![Box::new(Column(ColumnType::STRING))]);
        assert_eq!(column.level, MatchLevel::Fuzzy);
        assert_eq!(
            column.score,
            2 * i64::from(overload_distance(TypeTag::String, TypeTag::Char))
        );
    }

    #[test]
    fn geohash_family_is_exact() {
        let result = score("f(geohash)", vec![Box::new(Column(ColumnType::geohash(20)))]);
        assert_eq!(result.level, MatchLevel::Exact);
    }

    #[test]
    fn undefined_is_always_possible() {
        let result = score("f(uuid)", vec![Box::new(Column(ColumnType::UNDEFINED))]);
        assert_eq!(result.level, MatchLevel::Fuzzy);
        assert_eq!(result.score, i64::from(OVERLOAD_NONE));
    }

    #[test]
    fn cast_target_is_not_coerced() {
        let d = descriptor("cast(int, long)");
        let a = args(vec![Box::new(Constant::int(1)), Box::new(Constant::int(2))]);
        assert_eq!(score_candidate(&d, &a, true, false).level, MatchLevel::NoMatch);
        assert_eq!(score_candidate(&d, &a, false, false).level, MatchLevel::Partial);
    }

    #[test]
    fn window_context_adjustments() {
        let window = SignatureDescriptor::new(Arc::new(Sig {
            signature: "avg(double)",
            window: true,
            char_to_str: true,
        }))
        .unwrap();
        let plain = descriptor("avg(double)");
        let a = args(vec![Box::new(Column(ColumnType::DOUBLE))]);

        let in_window = score_candidate(&window, &a, false, true);
        assert_eq!(in_window, CandidateScore {
            level: MatchLevel::Exact,
            score: -WINDOW_BONUS
        });
        assert_eq!(score_candidate(&plain, &a, false, true).level, MatchLevel::Fuzzy);
        assert_eq!(score_candidate(&window, &a, false, false).level, MatchLevel::Fuzzy);
    }

    #[test]
    fn variadic_tail_is_not_scored() {
        let result = score("concat(var)", vec![Box::new(Column(ColumnType::BINARY))]);
        assert_eq!(result.level, MatchLevel::Exact);
    }
}
