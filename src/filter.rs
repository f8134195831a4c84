// src/filter.rs - Filter expressions over decoded labels

use crate::decoder::Decoded;
use crate::error::{ConfigError, FilterError};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    EqFold,
    NeFold,
    Match,
    NotMatch,
    MatchFold,
    NotMatchFold,
    Gt,
    Ge,
    Lt,
    Le,
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "==*" => Ok(Operator::EqFold),
            "!=*" => Ok(Operator::NeFold),
            "=~" => Ok(Operator::Match),
            "!~" => Ok(Operator::NotMatch),
            "=~*" => Ok(Operator::MatchFold),
            "!~*" => Ok(Operator::NotMatchFold),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            _ => Err(format!("Unknown operator: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
enum Predicate {
    Equal { literal: String, negate: bool },
    EqualFold { literal: String, negate: bool },
    Regex { regex: Regex, negate: bool },
    Number { op: Operator, literal: f64 },
}

/// One compiled `<label> <operator> <value>` expression
#[derive(Debug, Clone)]
pub struct Filter {
    label: String,
    operator: Operator,
    predicate: Predicate,
}

impl Filter {
    /// Compile an expression. When `known_labels` is given the label must be one of them.
    pub fn parse(expr: &str, known_labels: Option<&[String]>) -> Result<Self, ConfigError> {
        let tokens: Vec<&str> = expr.split_whitespace().collect();
        let &[label, operator, literal] = tokens.as_slice() else {
            return Err(ConfigError::FilterSyntax(expr.to_string()));
        };

        let operator: Operator = operator.parse().map_err(|_| ConfigError::UnknownOperator {
            expr: expr.to_string(),
            operator: operator.to_string(),
        })?;

        if let Some(known) = known_labels {
            if !known.iter().any(|l| l == label) {
                return Err(ConfigError::UnknownLabel {
                    expr: expr.to_string(),
                    label: label.to_string(),
                });
            }
        }

        let predicate = match operator {
            Operator::Eq | Operator::Ne => Predicate::Equal {
                literal: literal.to_string(),
                negate: operator == Operator::Ne,
            },
            Operator::EqFold | Operator::NeFold => Predicate::EqualFold {
                literal: literal.to_lowercase(),
                negate: operator == Operator::NeFold,
            },
            Operator::Match | Operator::NotMatch | Operator::MatchFold | Operator::NotMatchFold => {
                let source = match operator {
                    Operator::MatchFold | Operator::NotMatchFold => format!("(?i){}", literal),
                    _ => literal.to_string(),
                };
                let regex = Regex::new(&source).map_err(|source| ConfigError::FilterRegex {
                    expr: expr.to_string(),
                    source,
                })?;
                Predicate::Regex {
                    regex,
                    negate: matches!(operator, Operator::NotMatch | Operator::NotMatchFold),
                }
            }
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| ConfigError::FilterNumber {
                        expr: expr.to_string(),
                        literal: literal.to_string(),
                    })?;
                Predicate::Number {
                    op: operator,
                    literal: number,
                }
            }
        };

        Ok(Filter {
            label: label.to_string(),
            operator,
            predicate,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Evaluate against one candidate value
    pub fn eval(&self, value: &str) -> Result<bool, FilterError> {
        let result = match &self.predicate {
            Predicate::Equal { literal, negate } => (value == literal.as_str()) != *negate,
            Predicate::EqualFold { literal, negate } => (value.to_lowercase() == *literal) != *negate,
            Predicate::Regex { regex, negate } => regex.is_match(value) != *negate,
            Predicate::Number { op, literal } => {
                let candidate = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| FilterError::NotNumeric {
                        label: self.label.clone(),
                        value: value.to_string(),
                    })?;
                match op {
                    Operator::Gt => candidate > *literal,
                    Operator::Ge => candidate >= *literal,
                    Operator::Lt => candidate < *literal,
                    Operator::Le => candidate <= *literal,
                    _ => unreachable!("numeric predicate built from non-numeric operator"),
                }
            }
        };
        Ok(result)
    }
}

/// Conjunction of filters. Filters on labels missing from a line are ignored.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn compile<S: AsRef<str>>(
        exprs: &[S],
        known_labels: Option<&[String]>,
    ) -> Result<Self, ConfigError> {
        let filters = exprs
            .iter()
            .map(|e| Filter::parse(e.as_ref(), known_labels))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FilterSet { filters })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn matches(&self, decoded: &Decoded) -> Result<bool, FilterError> {
        for filter in &self.filters {
            if let Some(value) = decoded.get(filter.label()) {
                if !filter.eval(value)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
