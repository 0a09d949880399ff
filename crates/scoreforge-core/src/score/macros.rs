//! Declarative macros for the field-based score types.
//!
//! Every fixed-shape score is a struct of `i64` levels listed in priority
//! order, each tagged with its [`ScoreLevel`](super::ScoreLevel). Ordering,
//! arithmetic, the `Score` contract and parsing are generated from that list.

/// Generates `Ord`, `PartialOrd`, `Add`, `Sub`, `Neg` and `Debug`.
///
/// Fields must be listed highest priority first; ordering is lexicographic.
///
/// # Usage
/// ```ignore
/// impl_score_ops!(HardSoftScore { hard, soft } => of);
/// ```
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $( .then_with(|| self.$field.cmp(&other.$field)) )+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels: &[i64] = &[ $(self.$field),+ ];
                write!(f, "{}{:?}", stringify!($type), levels)
            }
        }
    };
}

/// Generates `Score` from the level list.
///
/// A score is feasible when every `Hard` level is non-negative.
/// `multiply_by` saturates at the `i64` bounds instead of overflowing.
///
/// # Usage
/// ```ignore
/// impl_score_levels!(HardSoftScore { hard: Hard, soft: Soft } => of);
/// ```
macro_rules! impl_score_levels {
    ($type:ident { $($field:ident : $level:ident),+ } => $ctor:ident) => {
        impl $crate::score::traits::Score for $type {
            fn is_feasible(&self) -> bool {
                true $( && ($crate::score::ScoreLevel::$level != $crate::score::ScoreLevel::Hard
                    || self.$field >= 0) )+
            }

            fn zero() -> Self {
                $type::ZERO
            }

            fn levels_count() -> usize {
                Self::LEVELS.len()
            }

            fn to_level_numbers(&self) -> Vec<i64> {
                vec![ $(self.$field),+ ]
            }

            fn from_level_numbers(levels: &[i64]) -> Self {
                match levels {
                    [ $($field),+ ] => $type::$ctor( $(*$field),+ ),
                    _ => panic!(
                        "{} requires exactly {} levels, got {}",
                        stringify!($type),
                        Self::LEVELS.len(),
                        levels.len()
                    ),
                }
            }

            fn multiply_by(&self, factor: i64) -> Self {
                $type::$ctor( $( self.$field.saturating_mul(factor) ),+ )
            }

            fn level_label(index: usize) -> $crate::score::ScoreLevel {
                match Self::LEVELS.get(index) {
                    Some(level) => *level,
                    None => panic!(
                        "{} has {} levels, got index {}",
                        stringify!($type),
                        Self::LEVELS.len(),
                        index
                    ),
                }
            }
        }

        impl $type {
            const LEVELS: &'static [$crate::score::ScoreLevel] =
                &[ $($crate::score::ScoreLevel::$level),+ ];
        }
    };
}

/// Generates `ParseableScore` and `Display` for the `"Xsuffix/Ysuffix"` format.
///
/// # Usage
/// ```ignore
/// impl_score_parse!(HardSoftScore { hard => "hard", soft => "soft" } => of);
/// ```
macro_rules! impl_score_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let suffixes: &[&str] = &[ $($suffix),+ ];
                let mut parts = s.split('/');
                let count = s.split('/').count();

                if count != suffixes.len() {
                    return Err($crate::score::traits::ScoreParseError::new(format!(
                        "Invalid {} format '{}': expected {} parts separated by '/'",
                        stringify!($type), s, suffixes.len()
                    )));
                }

                $(
                    let $field = {
                        let part = parts.next().unwrap_or_default().trim();
                        let digits = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::traits::ScoreParseError::new(format!(
                                "{} part '{}' must end with '{}'",
                                stringify!($field), part, $suffix
                            ))
                        })?;
                        digits.parse::<i64>().map_err(|e| {
                            $crate::score::traits::ScoreParseError::new(format!(
                                "Invalid {} score '{}': {}",
                                $suffix, digits, e
                            ))
                        })?
                    };
                )+

                Ok($type::$ctor( $($field),+ ))
            }

            fn to_string_repr(&self) -> String {
                let parts: Vec<String> = vec![ $( format!("{}{}", self.$field, $suffix) ),+ ];
                parts.join("/")
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::score::traits::ParseableScore::to_string_repr(self))
            }
        }
    };
}
