//! Ranking one user argument against candidate resource fields.

use crate::error::ResolutionError;

/// Strength of a match between an argument and one resource field.
///
/// Ordered weakest to strongest so `max` keeps the best match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchType {
    #[default]
    None,
    WildCard,
    CaseInsensitive,
    Exact,
}

/// Match a human-friendly field (title, hostname, name).
pub fn match_title(arg: &str, value: &str) -> MatchType {
    if arg == value {
        return MatchType::Exact;
    }
    if arg.to_lowercase() == value.to_lowercase() {
        return MatchType::CaseInsensitive;
    }
    if is_pattern(arg) && wildcard_match(&arg.to_lowercase(), &value.to_lowercase()) {
        return MatchType::WildCard;
    }
    MatchType::None
}

/// Match a canonical identifier. Only exact matches count.
pub fn match_uuid(arg: &str, uuid: &str) -> MatchType {
    if arg == uuid {
        MatchType::Exact
    } else {
        MatchType::None
    }
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?'])
}

/// Glob match supporting `*` (any run, including empty) and `?` (one char).
pub(crate) fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    // Last `*` seen and the text position it currently absorbs up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    p = star + 1;
                    t = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

/// All canonical ids one argument matched, with their strongest match type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub arg: String,
    matches: Vec<(String, MatchType)>,
}

impl Resolved {
    pub fn new(arg: impl Into<String>) -> Self {
        Self {
            arg: arg.into(),
            matches: Vec::new(),
        }
    }

    /// Record a match, keeping the strongest type seen for `uuid`.
    pub fn add_match(&mut self, uuid: &str, match_type: MatchType) {
        if match_type == MatchType::None {
            return;
        }
        match self.matches.iter_mut().find(|(id, _)| id == uuid) {
            Some((_, existing)) => *existing = (*existing).max(match_type),
            None => self.matches.push((uuid.to_string(), match_type)),
        }
    }

    fn best_matches(&self) -> Vec<String> {
        let Some(best) = self.matches.iter().map(|(_, kind)| *kind).max() else {
            return Vec::new();
        };
        self.matches
            .iter()
            .filter(|(_, kind)| *kind == best)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The single best match, or an ambiguity/not-found error.
    pub fn get_only(&self) -> Result<String, ResolutionError> {
        let mut best = self.best_matches();
        match best.len() {
            0 => Err(ResolutionError::NotFound(self.arg.clone())),
            1 => Ok(best.remove(0)),
            n => Err(ResolutionError::Ambiguous {
                arg: self.arg.clone(),
                matches: n,
            }),
        }
    }

    /// Every match at the strongest match type present.
    pub fn get_all(&self) -> Result<Vec<String>, ResolutionError> {
        let best = self.best_matches();
        if best.is_empty() {
            return Err(ResolutionError::NotFound(self.arg.clone()));
        }
        Ok(best)
    }
}
