use std::cmp::Ordering;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::domain::TVError;

pub const AGE_RANGE: std::ops::Range<u32> = 0..30;
pub const VISITS_RANGE: std::ops::Range<u32> = 0..100;
pub const PROGRESS_RANGE: std::ops::Range<u32> = 0..100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipStatus {
    Relationship,
    Complicated,
    Single,
}

impl RelationshipStatus {
    pub const ALL: [RelationshipStatus; 3] = [
        RelationshipStatus::Relationship,
        RelationshipStatus::Complicated,
        RelationshipStatus::Single,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Relationship => "relationship",
            RelationshipStatus::Complicated => "complicated",
            RelationshipStatus::Single => "single",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub visits: u32,
    pub progress: u32,
    pub status: RelationshipStatus,
}

/// A single cell value read from a [`Person`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Text(&'a str),
    Number(u32),
}

impl Value<'_> {
    /// Natural ordering: numbers numerically, text lexicographically.
    /// Mixed kinds never occur within one column, numbers sort first if they do.
    pub fn natural_cmp(&self, other: &Value<'_>) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The fields a column accessor can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Age,
    Visits,
    Progress,
    Status,
}

impl Field {
    pub fn from_accessor(accessor: &str) -> Result<Field, TVError> {
        match accessor {
            "firstName" => Ok(Field::FirstName),
            "lastName" => Ok(Field::LastName),
            "age" => Ok(Field::Age),
            "visits" => Ok(Field::Visits),
            "progress" => Ok(Field::Progress),
            "status" => Ok(Field::Status),
            other => Err(TVError::UnknownAccessor(other.to_string())),
        }
    }

    pub fn accessor(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Age => "age",
            Field::Visits => "visits",
            Field::Progress => "progress",
            Field::Status => "status",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Age | Field::Visits | Field::Progress)
    }

    pub fn value<'a>(&self, person: &'a Person) -> Value<'a> {
        match self {
            Field::FirstName => Value::Text(&person.first_name),
            Field::LastName => Value::Text(&person.last_name),
            Field::Age => Value::Number(person.age),
            Field::Visits => Value::Number(person.visits),
            Field::Progress => Value::Number(person.progress),
            Field::Status => Value::Text(person.status.as_str()),
        }
    }
}

/// Sum of visits over every record, independent of sort order or paging.
pub fn total_visits(people: &[Person]) -> u64 {
    people.iter().map(|p| p.visits as u64).sum()
}

/// Source of human readable names.
pub trait NameSource {
    fn word(&mut self) -> String;
}

const ONSETS: [&str; 18] = [
    "b", "br", "c", "ch", "d", "f", "g", "h", "j", "k", "l", "m", "n", "p", "r", "s", "t", "v",
];
const VOWELS: [&str; 8] = ["a", "e", "i", "o", "u", "ai", "ea", "ou"];
const CODAS: [&str; 8] = ["", "", "n", "r", "s", "l", "m", "th"];

/// Builds one capitalised word out of two or three consonant/vowel syllables.
pub struct SyllableNames<R: Rng> {
    rng: R,
}

impl<R: Rng> SyllableNames<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NameSource for SyllableNames<R> {
    fn word(&mut self) -> String {
        let syllables = self.rng.gen_range(2..=3);
        let mut word = String::new();
        for i in 0..syllables {
            word.push_str(ONSETS.choose(&mut self.rng).copied().unwrap_or("b"));
            word.push_str(VOWELS.choose(&mut self.rng).copied().unwrap_or("a"));
            if i == syllables - 1 {
                word.push_str(CODAS.choose(&mut self.rng).copied().unwrap_or(""));
            }
        }
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => word,
        }
    }
}

pub struct PersonGenerator<R: Rng, N: NameSource> {
    rng: R,
    names: N,
}

impl PersonGenerator<StdRng, SyllableNames<StdRng>> {
    /// Seeded generators produce the same people for the same seed.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let names = SyllableNames::new(StdRng::seed_from_u64(rng.r#gen()));
        PersonGenerator::new(rng, names)
    }
}

impl<R: Rng, N: NameSource> PersonGenerator<R, N> {
    pub fn new(rng: R, names: N) -> Self {
        Self { rng, names }
    }

    pub fn person(&mut self) -> Person {
        Person {
            first_name: self.names.word(),
            last_name: self.names.word(),
            age: self.rng.gen_range(AGE_RANGE),
            visits: self.rng.gen_range(VISITS_RANGE),
            progress: self.rng.gen_range(PROGRESS_RANGE),
            status: *RelationshipStatus::ALL
                .choose(&mut self.rng)
                .unwrap_or(&RelationshipStatus::Single),
        }
    }

    pub fn generate(&mut self, n: usize) -> Vec<Person> {
        let people: Vec<Person> = (0..n).map(|_| self.person()).collect();
        info!("Generated {} people", people.len());
        debug!("Total visits of generated people: {}", total_visits(&people));
        people
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(first: &str, age: u32, visits: u32) -> Person {
        Person {
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            age,
            visits,
            progress: 0,
            status: RelationshipStatus::Single,
        }
    }

    #[test]
    fn generate_returns_requested_count_within_ranges() {
        let mut generator = PersonGenerator::from_seed(Some(42));
        for n in [0, 1, 20, 257] {
            let people = generator.generate(n);
            assert_eq!(people.len(), n);
            for p in people.iter() {
                assert!(AGE_RANGE.contains(&p.age));
                assert!(VISITS_RANGE.contains(&p.visits));
                assert!(PROGRESS_RANGE.contains(&p.progress));
                assert!(RelationshipStatus::ALL.contains(&p.status));
                assert!(!p.first_name.is_empty());
                assert!(!p.last_name.is_empty());
            }
        }
    }

    #[test]
    fn same_seed_same_people() {
        let a = PersonGenerator::from_seed(Some(3)).generate(30);
        let b = PersonGenerator::from_seed(Some(3)).generate(30);
        assert_eq!(a, b);
    }

    #[test]
    fn names_are_capitalised_words_without_digits() {
        let mut names = SyllableNames::new(StdRng::seed_from_u64(9));
        for _ in 0..100 {
            let w = names.word();
            assert!(w.chars().next().is_some_and(|c| c.is_uppercase()));
            assert!(w.chars().all(|c| c.is_alphabetic()));
        }
    }

    #[test]
    fn accessors_resolve_to_fields() {
        for field in [
            Field::FirstName,
            Field::LastName,
            Field::Age,
            Field::Visits,
            Field::Progress,
            Field::Status,
        ] {
            assert_eq!(Field::from_accessor(field.accessor()).ok(), Some(field));
        }
        assert!(matches!(
            Field::from_accessor("email"),
            Err(TVError::UnknownAccessor(a)) if a == "email"
        ));
    }

    #[test]
    fn values_compare_naturally() {
        // Numeric, not lexicographic: 9 < 10
        assert_eq!(
            Value::Number(9).natural_cmp(&Value::Number(10)),
            Ordering::Less
        );
        assert_eq!(Value::Text("b").natural_cmp(&Value::Text("a")), Ordering::Greater);
        let p = person("Ann", 3, 4);
        assert_eq!(Field::Status.value(&p), Value::Text("single"));
        assert_eq!(Field::Age.value(&p).to_string(), "3");
    }

    #[test]
    fn total_visits_sums_all_records() {
        let people = vec![person("a", 1, 10), person("b", 2, 20), person("c", 3, 5)];
        assert_eq!(total_visits(&people), 35);
        assert_eq!(total_visits(&[]), 0);
    }
}
